// ==========================================
// 车队司机评分系统 - 领域模型层
// ==========================================
// 职责: 定义原始事实、派生结果、月度批次与核心类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod facts;
pub mod month_run;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use facts::{
    RawCleaningFact, RawDieselFact, RawFactBundle, RawImportCounts, RawIncidentFact,
    RawSpareFact, RawTripFact, SiteRosterFact,
};
pub use month_run::{first_of_month, normalize_to_month, MonthRun};
pub use summary::{
    DriverScorecard, FpdSummary, MileageSummary, SpareUsageSummary, SpeedViolationSummary,
    SupervisorTeamScore,
};
pub use types::{
    DriverIdentity, FirstPointVisit, MonthRunId, MonthRunStatus, PipelineStage, TRIP_TYPE_LOGIN,
};
