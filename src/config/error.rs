// ==========================================
// 车队司机评分系统 - 配置错误类型
// ==========================================
// 约定: 配置错误一律致命，在任何数据读写之前中止
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("未配置数据库路径: 请设置环境变量 {env_var}")]
    MissingDatabasePath { env_var: &'static str },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置读取失败 (key: {key}): {message}")]
    ReadError { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
