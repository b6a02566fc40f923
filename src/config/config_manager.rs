// ==========================================
// 五险一金计算系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::upload_config_trait::UploadConfigReader;
use crate::db::{init_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 全局配置作用域
const GLOBAL_SCOPE: &str = "global";

const DEFAULT_ERROR_PREVIEW_LIMIT: usize = 10;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "xlsx,xls,csv";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入（覆盖）global scope 的配置值
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取 global scope 全部配置（按键排序）
    pub fn get_config_snapshot(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }
}

// ==========================================
// UploadConfigReader 实现
// ==========================================
#[async_trait]
impl UploadConfigReader for ConfigManager {
    async fn get_error_preview_limit(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::UPLOAD_ERROR_PREVIEW_LIMIT,
            &DEFAULT_ERROR_PREVIEW_LIMIT.to_string(),
        )?;
        Ok(value
            .trim()
            .parse::<usize>()
            .unwrap_or(DEFAULT_ERROR_PREVIEW_LIMIT))
    }

    async fn get_allowed_extensions(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::UPLOAD_ALLOWED_EXTENSIONS,
            DEFAULT_ALLOWED_EXTENSIONS,
        )?;

        let extensions: Vec<String> = value
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if extensions.is_empty() {
            Ok(DEFAULT_ALLOWED_EXTENSIONS
                .split(',')
                .map(str::to_string)
                .collect())
        } else {
            Ok(extensions)
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 上传
    pub const UPLOAD_ERROR_PREVIEW_LIMIT: &str = "upload.error_preview_limit";
    pub const UPLOAD_ALLOWED_EXTENSIONS: &str = "upload.allowed_extensions";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn setup_config() -> (NamedTempFile, ConfigManager) {
        let temp_file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(temp_file.path().to_str().unwrap()).unwrap();
        (temp_file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let (_temp, manager) = setup_config();

        assert_eq!(manager.get_error_preview_limit().await.unwrap(), 10);
        assert_eq!(
            manager.get_allowed_extensions().await.unwrap(),
            vec!["xlsx", "xls", "csv"]
        );
        assert!(manager.get_config_snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overrides_are_read_back() {
        let (_temp, manager) = setup_config();

        manager
            .set_global_config_value(config_keys::UPLOAD_ERROR_PREVIEW_LIMIT, "3")
            .unwrap();
        manager
            .set_global_config_value(config_keys::UPLOAD_ALLOWED_EXTENSIONS, " .XLSX , csv ")
            .unwrap();

        assert_eq!(manager.get_error_preview_limit().await.unwrap(), 3);
        assert_eq!(
            manager.get_allowed_extensions().await.unwrap(),
            vec!["xlsx", "csv"]
        );
        assert_eq!(manager.get_config_snapshot().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_limit_falls_back_to_default() {
        let (_temp, manager) = setup_config();

        manager
            .set_global_config_value(config_keys::UPLOAD_ERROR_PREVIEW_LIMIT, "many")
            .unwrap();

        assert_eq!(manager.get_error_preview_limit().await.unwrap(), 10);
    }
}
