// ==========================================
// 车队司机评分系统 - 配置管理器
// ==========================================
// 职责: 流水线配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::db::open_sqlite_connection;
use crate::repository::DEFAULT_PAGE_SIZE;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

/// 全局配置作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// PipelineSettings - 流水线参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub page_size: usize,         // 分页读取页大小: DEFAULT_PAGE_SIZE
    pub insert_chunk_size: usize, // 原始数据分块写入大小: 500
    pub min_login_trips: i64,     // 评分卡准入: 登录数必须 > 该值 (默认 4)
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            insert_chunk_size: 500,
            min_login_trips: 4,
        }
    }
}

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
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ConfigError::ReadError {
            key: "db_path".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self, key: &str) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| ConfigError::ReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn(key)?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ConfigError::ReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn(key)?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )
        .map_err(|e| ConfigError::ReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// 读取流水线参数（缺失项取默认值，非法值报错）
    pub fn load_pipeline_settings(&self) -> ConfigResult<PipelineSettings> {
        let defaults = PipelineSettings::default();

        let page_size = self.read_positive(config_keys::PAGE_SIZE, defaults.page_size as i64)?;
        let insert_chunk_size =
            self.read_positive(config_keys::INSERT_CHUNK_SIZE, defaults.insert_chunk_size as i64)?;
        let min_login_trips = match self.get_global_config_value(config_keys::MIN_LOGIN_TRIPS)? {
            Some(raw) => raw.trim().parse::<i64>().ok().filter(|v| *v >= 0).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: config_keys::MIN_LOGIN_TRIPS.to_string(),
                    value: raw.clone(),
                    message: "必须为非负整数".to_string(),
                }
            })?,
            None => defaults.min_login_trips,
        };

        Ok(PipelineSettings {
            page_size: page_size as usize,
            insert_chunk_size: insert_chunk_size as usize,
            min_login_trips,
        })
    }

    fn read_positive(&self, key: &str, default: i64) -> ConfigResult<i64> {
        match self.get_global_config_value(key)? {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: "必须为正整数".to_string(),
                }),
            None => Ok(default),
        }
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 分页
    pub const PAGE_SIZE: &str = "pipeline/page_size";
    pub const INSERT_CHUNK_SIZE: &str = "pipeline/insert_chunk_size";

    // 评分卡准入
    pub const MIN_LOGIN_TRIPS: &str = "scorecard/min_login_trips";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_unset() {
        let manager = setup();
        assert_eq!(
            manager.load_pipeline_settings().unwrap(),
            PipelineSettings::default()
        );
        assert_eq!(PipelineSettings::default().page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_override_and_invalid_values() {
        let manager = setup();
        manager.set_global_config_value(config_keys::PAGE_SIZE, "2").unwrap();
        manager.set_global_config_value(config_keys::MIN_LOGIN_TRIPS, "0").unwrap();

        let settings = manager.load_pipeline_settings().unwrap();
        assert_eq!(settings.page_size, 2);
        assert_eq!(settings.min_login_trips, 0);

        manager.set_global_config_value(config_keys::PAGE_SIZE, "0").unwrap();
        assert!(matches!(
            manager.load_pipeline_settings(),
            Err(ConfigError::InvalidValue { .. })
        ));

        manager.set_global_config_value(config_keys::PAGE_SIZE, "abc").unwrap();
        assert!(matches!(
            manager.load_pipeline_settings(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
