// ==========================================
// 五险一金计算系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{CalculationApi, UploadApi};
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::repository::ContributionRepositoryImpl;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SOCIAL_INSURANCE_DB_PATH";

const APP_DIR_NAME: &str = "social-insurance-calc";
const DB_FILE_NAME: &str = "social_insurance.db";

/// 应用状态
///
/// 一个 SQLite 连接在仓储与配置管理器之间共享
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 记录存储
    pub repo: Arc<ContributionRepositoryImpl>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 上传API
    pub upload_api: Arc<UploadApi>,

    /// 计算API
    pub calculation_api: Arc<CalculationApi>,
}

impl AppState {
    /// 打开数据库并组装全部 API
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let repo = Arc::new(
            ContributionRepositoryImpl::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ContributionRepository: {}", e))?,
        );
        let config = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let upload_api = Arc::new(UploadApi::new(repo.clone(), config.clone()));
        let calculation_api = Arc::new(CalculationApi::new(repo.clone(), config.clone()));

        Ok(Self {
            db_path,
            repo,
            config,
            upload_api,
            calculation_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join(APP_DIR_NAME);
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_app_state_shares_one_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("app.db");

        let state = AppState::new(db_path.to_string_lossy().to_string()).unwrap();

        assert!(db_path.exists());
        assert!(state.config.get_config_snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_default_db_path_prefers_env_var() {
        std::env::set_var(DB_PATH_ENV, "  /tmp/custom.db  ");
        let path = get_default_db_path();
        std::env::remove_var(DB_PATH_ENV);

        assert_eq!(path, "/tmp/custom.db");
    }
}
