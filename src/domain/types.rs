// ==========================================
// 五险一金计算系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ==========================================
// 上传类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadKind {
    Cities,   // 城市社保标准
    Salaries, // 员工工资
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::Cities => write!(f, "city standards"),
            UploadKind::Salaries => write!(f, "salary records"),
        }
    }
}

// ==========================================
// 源文件格式
// ==========================================
// 由上传文件名扩展名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Excel, // .xlsx / .xls
    Csv,   // .csv
}

impl SourceFormat {
    /// 根据扩展名识别格式（大小写不敏感）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().to_lowercase().as_str() {
            "xlsx" | "xls" => Some(SourceFormat::Excel),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }

    /// 根据文件名识别格式
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        file_extension(file_name).and_then(|ext| Self::from_extension(&ext))
    }
}

/// 文件扩展名（小写, 不含点）
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
