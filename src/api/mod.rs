// ==========================================
// 车队司机评分系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行与外部调用方使用
// ==========================================

pub mod error;
pub mod scorecard_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use scorecard_api::{
    validate_month, ScorecardApi, ScorecardEntry, ScorecardView, StageRequest, StageResponse,
};
