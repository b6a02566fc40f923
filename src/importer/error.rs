// ==========================================
// 五险一金计算系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 仅覆盖文件级错误（整文件中止）; 行级错误以字符串形式累积
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("file is empty")]
    EmptyFile,

    #[error("file parsing failed: {0}")]
    FileReadError(String),

    #[error("file parsing failed: {0}")]
    ExcelParseError(String),

    #[error("file parsing failed: {0}")]
    CsvParseError(String),

    // ===== 表头映射错误 =====
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_all_fields() {
        let err = ImportError::MissingColumns(vec![
            "year (年份)".to_string(),
            "rate (比例)".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing required columns: year (年份), rate (比例)"
        );
    }

    #[test]
    fn test_empty_file_message() {
        assert_eq!(ImportError::EmptyFile.to_string(), "file is empty");
    }
}
