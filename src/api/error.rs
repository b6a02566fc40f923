// ==========================================
// 五险一金计算系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 转换下层错误为调用方可读的错误消息
// 约定: 上传/计算接口不向外抛错, 错误折叠进 ApiResponse
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 扩展名列表的展示文本: `.xlsx, .xls and .csv`
pub fn describe_extensions(extensions: &[String]) -> String {
    let dotted: Vec<String> = extensions.iter().map(|e| format!(".{}", e)).collect();
    match dotted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("only {} files are supported", describe_extensions(.allowed))]
    UnsupportedFileType {
        file_name: String,
        allowed: Vec<String>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("configuration read failed: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("database lock failed: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("constraint violated: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("stored field {} is invalid: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
