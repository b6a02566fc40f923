// ==========================================
// 五险一金计算系统 - 上传配置读取 Trait
// ==========================================
// 职责: 定义上传接口所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// UploadConfigReader Trait
// ==========================================
// 用途: 上传 / 计算接口的配置读取
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait UploadConfigReader: Send + Sync {
    /// 返回给调用方的明细错误条数上限
    ///
    /// # 默认值
    /// - 10
    async fn get_error_preview_limit(&self) -> Result<usize, Box<dyn Error>>;

    /// 允许上传的文件扩展名（小写, 不含点）
    ///
    /// # 默认值
    /// - ["xlsx", "xls", "csv"]
    async fn get_allowed_extensions(&self) -> Result<Vec<String>, Box<dyn Error>>;
}
