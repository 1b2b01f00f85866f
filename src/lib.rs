// ==========================================
// 车队司机评分系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 月度批处理评分流水线（单月、可重跑、整表替换）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 通用表存储
pub mod repository;

// 引擎层 - 聚合与评分
pub mod engine;

// 导入层 - CSV 原始事实
pub mod importer;

// 配置层 - 数据库路径与流水线参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DriverIdentity, DriverScorecard, MonthRun, MonthRunId, MonthRunStatus, PipelineStage,
    RawFactBundle,
};

// 引擎
pub use engine::{RunController, RunReport, StageOutcome};

// API
pub use api::ScorecardApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车队司机评分系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
