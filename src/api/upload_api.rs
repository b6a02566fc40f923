// ==========================================
// 五险一金计算系统 - 上传API
// ==========================================
// 职责: 文件类型检查 → 解析 → 批量落库 → 组装响应
// 约定: 任何失败都折叠为 success=false 的 ApiResponse, 不向外抛错
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::{summarize_errors, ApiResponse};
use crate::config::UploadConfigReader;
use crate::domain::{file_extension, ParseOutcome, SourceFormat, UploadKind, UploadOutcome};
use crate::importer::{parse_cities, parse_salaries};
use crate::repository::{ContributionRepository, RepositoryResult};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// 上传API
pub struct UploadApi {
    repo: Arc<dyn ContributionRepository>,
    config: Arc<dyn UploadConfigReader>,
}

impl UploadApi {
    /// 创建新的UploadApi实例
    pub fn new(repo: Arc<dyn ContributionRepository>, config: Arc<dyn UploadConfigReader>) -> Self {
        Self { repo, config }
    }

    /// 上传城市社保标准文件
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于识别格式）
    /// - bytes: 文件内容
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_cities(&self, file_name: &str, bytes: &[u8]) -> ApiResponse<UploadOutcome> {
        let format = match self.check_file_type(file_name).await {
            Ok(format) => format,
            Err(e) => return self.reject(e),
        };

        let parsed = parse_cities(format, bytes);
        if !parsed.success {
            return self.parse_failure(UploadKind::Cities, &parsed).await;
        }

        let ParseOutcome { records, errors, .. } = parsed;
        let inserted = self.repo.bulk_insert_cities(records).await;
        self.finish(UploadKind::Cities, inserted, errors)
    }

    /// 上传员工工资文件
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于识别格式）
    /// - bytes: 文件内容
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_salaries(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> ApiResponse<UploadOutcome> {
        let format = match self.check_file_type(file_name).await {
            Ok(format) => format,
            Err(e) => return self.reject(e),
        };

        let parsed = parse_salaries(format, bytes);
        if !parsed.success {
            return self.parse_failure(UploadKind::Salaries, &parsed).await;
        }

        let ParseOutcome { records, errors, .. } = parsed;
        let inserted = self.repo.bulk_insert_salaries(records).await;
        self.finish(UploadKind::Salaries, inserted, errors)
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    /// 检查扩展名是否在允许列表中, 并识别源文件格式
    async fn check_file_type(&self, file_name: &str) -> ApiResult<SourceFormat> {
        let allowed = self
            .config
            .get_allowed_extensions()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let permitted = file_extension(file_name)
            .map_or(false, |ext| allowed.iter().any(|a| *a == ext));

        match SourceFormat::from_file_name(file_name) {
            Some(format) if permitted => Ok(format),
            _ => Err(ApiError::UnsupportedFileType {
                file_name: file_name.to_string(),
                allowed,
            }),
        }
    }

    fn reject(&self, err: ApiError) -> ApiResponse<UploadOutcome> {
        let message = err.to_string();
        match err {
            ApiError::UnsupportedFileType { file_name, .. } => {
                warn!(file_name = %file_name, "文件类型不受支持");
                ApiResponse::failure(message, None)
            }
            _ => {
                warn!(error = %message, "上传被拒绝");
                ApiResponse::failure("upload failed", Some(message))
            }
        }
    }

    async fn parse_failure<T>(
        &self,
        kind: UploadKind,
        parsed: &ParseOutcome<T>,
    ) -> ApiResponse<UploadOutcome> {
        let limit = match self.config.get_error_preview_limit().await {
            Ok(limit) => limit,
            Err(e) => {
                warn!(error = %e, "读取错误预览条数失败, 显示全部错误");
                parsed.errors.len()
            }
        };

        warn!(kind = %kind, error_count = parsed.errors.len(), "表格解析失败");
        ApiResponse::failure(
            "spreadsheet parsing failed",
            Some(summarize_errors(&parsed.errors, limit)),
        )
    }

    fn finish(
        &self,
        kind: UploadKind,
        inserted: RepositoryResult<usize>,
        errors: Vec<String>,
    ) -> ApiResponse<UploadOutcome> {
        match inserted {
            Ok(inserted_count) => {
                info!(kind = %kind, inserted_count, rejected = errors.len(), "上传完成");
                ApiResponse::ok(
                    format!("uploaded {} {}", inserted_count, kind),
                    UploadOutcome {
                        success: true,
                        inserted_count,
                        errors,
                    },
                )
            }
            Err(e) => {
                error!(kind = %kind, error = %e, "数据插入失败");
                ApiResponse::failure("data insert failed", Some(e.to_string()))
            }
        }
    }
}
