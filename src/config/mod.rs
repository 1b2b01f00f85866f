// ==========================================
// 车队司机评分系统 - 配置层
// ==========================================
// 职责: 数据库路径解析 + 流水线参数管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, PipelineSettings};
pub use error::{ConfigError, ConfigResult};

use std::path::PathBuf;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FLEET_SCORECARD_DB_PATH";

/// 解析数据库路径
///
/// 优先级:
/// 1. 环境变量 FLEET_SCORECARD_DB_PATH（非空）
/// 2. 用户数据目录 <data_dir>/fleet-scorecard/fleet_scorecard.db
/// 3. 都不可用 → ConfigError::MissingDatabasePath
pub fn resolve_db_path() -> ConfigResult<String> {
    resolve_db_path_from(std::env::var(DB_PATH_ENV).ok(), dirs::data_dir())
}

fn resolve_db_path_from(env_value: Option<String>, data_dir: Option<PathBuf>) -> ConfigResult<String> {
    if let Some(path) = env_value {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let dir = data_dir
        .map(|d| d.join("fleet-scorecard"))
        .ok_or(ConfigError::MissingDatabasePath { env_var: DB_PATH_ENV })?;

    // 确保目录存在
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::InvalidValue {
        key: DB_PATH_ENV.to_string(),
        value: dir.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(dir.join("fleet_scorecard.db").to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_path_wins() {
        let path = resolve_db_path_from(Some(" /tmp/x.db ".to_string()), None).unwrap();
        assert_eq!(path, "/tmp/x.db");
    }

    #[test]
    fn test_missing_path_is_config_error() {
        let err = resolve_db_path_from(Some("   ".to_string()), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabasePath { .. }));
    }

    #[test]
    fn test_data_dir_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_db_path_from(None, Some(dir.path().to_path_buf())).unwrap();
        assert!(path.ends_with("fleet_scorecard.db"));
        assert!(dir.path().join("fleet-scorecard").is_dir());
    }
}
