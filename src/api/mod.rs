// ==========================================
// 五险一金计算系统 - API 层
// ==========================================
// 职责: 提供上传与计算接口, 供命令行入口调用
// ==========================================

pub mod calculation_api;
pub mod error;
pub mod response;
pub mod upload_api;

// 重导出核心类型
pub use calculation_api::CalculationApi;
pub use error::{ApiError, ApiResult};
pub use response::{summarize_errors, ApiResponse};
pub use upload_api::UploadApi;
