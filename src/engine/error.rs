// ==========================================
// 五险一金计算系统 - 计算引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: Display 文本即返回给调用方的错误描述
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 计算流程错误（整次计算失败, 不做部分提交）
#[derive(Error, Debug)]
pub enum RatingError {
    // ===== 上游数据缺失 =====
    #[error("no salary data found, upload employee salary data first")]
    NoSalaryData,

    #[error("no city standards found, upload city standards first")]
    NoCityStandards,

    // ===== 存储错误（原样透传仓储错误文本）=====
    #[error("{0}")]
    LoadSalaries(#[source] RepositoryError),

    #[error("{0}")]
    LoadCities(#[source] RepositoryError),

    #[error("{0}")]
    StoreResults(#[source] RepositoryError),

    // ===== 数值错误 =====
    #[error("arithmetic error (employee={employee_name}): {message}")]
    Arithmetic {
        employee_name: String,
        message: String,
    },
}

pub type RatingResult<T> = Result<T, RatingError>;
