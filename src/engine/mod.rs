// ==========================================
// 车队司机评分系统 - 引擎层
// ==========================================
// 职责: 身份解析、分项聚合、评分合成、流水线编排
// 红线: Engine 不拼 SQL，只经由 TableStore 读写
// ==========================================

pub mod error;
pub mod fpd;
pub mod identity;
pub mod mileage;
pub mod mode_counter;
pub mod normalize;
pub mod run_controller;
pub mod scorecard;
pub mod scoring;
pub mod site_attribution;
pub mod spare_usage;
pub mod speed_violation;
pub mod team_performance;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use fpd::FpdAggregator;
pub use identity::{normalize_employee_id, resolve_identity};
pub use mileage::{classify_variation, MileageAggregator};
pub use mode_counter::ModeCounter;
pub use run_controller::{RunController, RunReport, StageOutcome, StageReport};
pub use scorecard::{load_lookups, ComponentInputs, ComponentLookups, ScorecardCombiner};
pub use site_attribution::{SiteAssignment, SiteAttribution};
pub use spare_usage::SpareUsageAggregator;
pub use speed_violation::SpeedViolationAggregator;
pub use team_performance::TeamPerformanceAggregator;
