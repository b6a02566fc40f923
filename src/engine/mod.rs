// ==========================================
// 五险一金计算系统 - 引擎层
// ==========================================
// 职责: 工资聚合、城市匹配、基数截断与费用计算
// 红线: Engine 不拼 SQL, 数据读写经由 Repository
// ==========================================

pub mod error;
pub mod orchestrator;
pub mod rating;

// 重导出核心引擎
pub use error::{RatingError, RatingResult};
pub use orchestrator::CalculationOrchestrator;
pub use rating::RatingEngine;
