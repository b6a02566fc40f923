// ==========================================
// 五险一金计算系统 - API 响应结构
// ==========================================
// 职责: 上传 / 计算接口统一返回结构
// ==========================================

use serde::{Deserialize, Serialize};

/// API 统一响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 操作是否成功
    pub success: bool,
    /// 面向用户的结果说明
    pub message: String,
    /// 成功时的结果数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 失败时的错误详情
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error,
        }
    }
}

/// 拼接错误明细: 前 limit 条以 "; " 连接, 超出部分以 "(and N more)" 概括
pub fn summarize_errors(errors: &[String], limit: usize) -> String {
    let shown = errors.iter().take(limit).cloned().collect::<Vec<_>>().join("; ");
    let hidden = errors.len().saturating_sub(limit);

    match (shown.is_empty(), hidden) {
        (_, 0) => shown,
        (true, n) => format!("(and {} more)", n),
        (false, n) => format!("{} (and {} more)", shown, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("row {}: bad", i + 1)).collect()
    }

    #[test]
    fn test_summarize_within_limit() {
        assert_eq!(summarize_errors(&errors(2), 10), "row 2: bad; row 3: bad");
        assert_eq!(summarize_errors(&[], 10), "");
    }

    #[test]
    fn test_summarize_truncates() {
        assert_eq!(
            summarize_errors(&errors(4), 2),
            "row 2: bad; row 3: bad (and 2 more)"
        );
        assert_eq!(summarize_errors(&errors(3), 0), "(and 3 more)");
    }

    #[test]
    fn test_failure_serializes_without_data() {
        let resp: ApiResponse<usize> = ApiResponse::failure("calculation failed", Some("x".into()));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"], "x");
    }
}
