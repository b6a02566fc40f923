// ==========================================
// 五险一金计算系统 - 配置层
// ==========================================
// 职责: 系统配置读取, 缺省时回退默认值
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod upload_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use upload_config_trait::UploadConfigReader;
