// ==========================================
// 五险一金计算系统 - 操作结果模型
// ==========================================
// 职责: 解析/上传/计算三类操作返回给调用方的结构化结果
// 约定: 文件级与上游错误不抛出, 以 success=false + errors 形式返回
// ==========================================

use serde::{Deserialize, Serialize};

/// 表格解析结果（部分成功模型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome<T> {
    /// 至少一行校验通过时为 true
    pub success: bool,
    /// 校验通过的记录（保持源文件顺序）
    pub records: Vec<T>,
    /// 行级错误或文件级错误
    pub errors: Vec<String>,
}

impl<T> ParseOutcome<T> {
    /// 文件级失败：零记录, 单条错误
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            records: Vec::new(),
            errors: vec![error.into()],
        }
    }

    /// 由逐行校验结果汇总
    pub fn from_rows(records: Vec<T>, errors: Vec<String>) -> Self {
        Self {
            success: !records.is_empty(),
            records,
            errors,
        }
    }
}

/// 上传结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    pub inserted_count: usize,
    pub errors: Vec<String>,
}

/// 计算结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    pub success: bool,
    pub processed_count: usize,
    pub errors: Vec<String>,
}

impl CalculationOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            processed_count: 0,
            errors: vec![error.into()],
        }
    }
}
