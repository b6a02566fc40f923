// ==========================================
// 五险一金计算系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 流程: 上传城市标准 / 员工工资 → 聚合计算 → 追加结果
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 聚合与费率计算
pub mod engine;

// 导入层 - 表格解析
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    CalculationOutcome, CityStandard, ContributionResult, ParseOutcome, SalaryRecord,
    SourceFormat, UploadKind, UploadOutcome,
};

// 导入
pub use importer::{parse_cities, parse_salaries};

// 引擎
pub use engine::{CalculationOrchestrator, RatingEngine, RatingError};

// 仓储
pub use repository::{ContributionRepository, ContributionRepositoryImpl};

// API
pub use api::{ApiResponse, CalculationApi, UploadApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "五险一金计算系统";
