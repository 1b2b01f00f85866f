// ==========================================
// 车队司机评分系统 - 引擎层错误类型
// ==========================================
// 约定: 存储错误原样上抛，作为阶段错误信息
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// 存储读写失败（消息保持原样）
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

pub type EngineResult<T> = Result<T, EngineError>;
