// ==========================================
// 五险一金计算系统 - 计算API
// ==========================================
// 职责: 触发一次完整计算; 查询最近的计算结果
// ==========================================

use crate::api::error::ApiResult;
use crate::api::response::{summarize_errors, ApiResponse};
use crate::config::UploadConfigReader;
use crate::domain::{CalculationOutcome, ContributionResult};
use crate::engine::CalculationOrchestrator;
use crate::repository::ContributionRepository;
use std::sync::Arc;
use tracing::warn;

/// 计算API
pub struct CalculationApi {
    repo: Arc<dyn ContributionRepository>,
    config: Arc<dyn UploadConfigReader>,
    orchestrator: CalculationOrchestrator,
}

impl CalculationApi {
    /// 创建新的CalculationApi实例
    pub fn new(repo: Arc<dyn ContributionRepository>, config: Arc<dyn UploadConfigReader>) -> Self {
        Self {
            orchestrator: CalculationOrchestrator::new(repo.clone()),
            repo,
            config,
        }
    }

    /// 执行计算并追加结果
    pub async fn calculate(&self) -> ApiResponse<CalculationOutcome> {
        let outcome = self.orchestrator.calculate_and_store().await;

        if outcome.success {
            return ApiResponse::ok(
                format!(
                    "calculation finished, processed {} employees",
                    outcome.processed_count
                ),
                outcome,
            );
        }

        let limit = match self.config.get_error_preview_limit().await {
            Ok(limit) => limit,
            Err(e) => {
                warn!(error = %e, "读取错误预览条数失败, 显示全部错误");
                outcome.errors.len()
            }
        };
        ApiResponse::failure(
            "calculation failed",
            Some(summarize_errors(&outcome.errors, limit)),
        )
    }

    /// 最近的计算结果（按计算时间倒序）
    pub async fn list_results(&self, limit: usize) -> ApiResult<Vec<ContributionResult>> {
        Ok(self.repo.list_results(limit).await?)
    }
}
