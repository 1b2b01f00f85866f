// ==========================================
// 车队司机评分系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供通用表存储接口与 SQLite 实现,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod month_run_repo;
pub mod records;
pub mod sql_builder;
pub mod sqlite_store;
pub mod table_store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use month_run_repo::MonthRunRepository;
pub use sqlite_store::SqliteTableStore;
pub use table_store::{Filter, PagedScan, TableRecord, TableStore, DEFAULT_PAGE_SIZE};
