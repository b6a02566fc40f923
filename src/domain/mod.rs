// ==========================================
// 五险一金计算系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑, 不含计算逻辑
// ==========================================

pub mod city;
pub mod contribution;
pub mod outcome;
pub mod salary;
pub mod types;

// 重导出核心类型
pub use city::CityStandard;
pub use contribution::ContributionResult;
pub use outcome::{CalculationOutcome, ParseOutcome, UploadOutcome};
pub use salary::SalaryRecord;
pub use types::{file_extension, SourceFormat, UploadKind};
