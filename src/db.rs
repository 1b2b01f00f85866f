// ==========================================
// 车队司机评分系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，避免任何读写无限期阻塞
// - 统一建表脚本（幂等），所有月度表以 month_run_id 分区
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 原始事实表（导入产生）
pub const RAW_FACT_TABLES: [&str; 6] = [
    "operation_summary_report",
    "spare_utilization_report",
    "cleaning_report",
    "incident_report",
    "diesel_report",
    "site_am_sup_load_map",
];

/// 派生表（评分流水线产生）
pub const DERIVED_TABLES: [&str; 6] = [
    "fpd_driver_summary",
    "spare_usage_summary",
    "speed_violation_summary",
    "mileage_summary",
    "driver_scorecard",
    "supervisor_team_score",
];

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 说明：
/// - 所有月度表都带 month_run_id，重导入时按 month_run_id 整体删除
/// - 派生表的业务键加 UNIQUE 约束，保证同一月度内“每司机/每车辆一行”
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS month_runs (
    id TEXT PRIMARY KEY,
    month TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS operation_summary_report (
    month_run_id TEXT NOT NULL,
    driver_name TEXT,
    trip_type TEXT,
    scheduled_start_end_time TEXT,
    first_point_visit TEXT,
    speed_violation TEXT,
    vehicle_no TEXT,
    corp_name TEXT
);
CREATE INDEX IF NOT EXISTS idx_osr_month_trip ON operation_summary_report(month_run_id, trip_type);

CREATE TABLE IF NOT EXISTS spare_utilization_report (
    month_run_id TEXT NOT NULL,
    scheduled_employee_id TEXT,
    request_date TEXT
);
CREATE INDEX IF NOT EXISTS idx_sur_month ON spare_utilization_report(month_run_id);

CREATE TABLE IF NOT EXISTS diesel_report (
    month_run_id TEXT NOT NULL,
    vehicle_number TEXT,
    ideal_mileage REAL,
    total_km REAL,
    diesel_in_litres REAL,
    mileage REAL
);
CREATE INDEX IF NOT EXISTS idx_diesel_month ON diesel_report(month_run_id);

CREATE TABLE IF NOT EXISTS incident_report (
    month_run_id TEXT NOT NULL,
    emp_id TEXT,
    driver_incident_score REAL
);
CREATE INDEX IF NOT EXISTS idx_incident_month ON incident_report(month_run_id);

CREATE TABLE IF NOT EXISTS cleaning_report (
    month_run_id TEXT NOT NULL,
    emp_id TEXT,
    vehicle_exterior_score REAL
);
CREATE INDEX IF NOT EXISTS idx_cleaning_month ON cleaning_report(month_run_id);

CREATE TABLE IF NOT EXISTS site_am_sup_load_map (
    month_run_id TEXT NOT NULL,
    site TEXT,
    manager TEXT,
    supervisor TEXT
);
CREATE INDEX IF NOT EXISTS idx_site_map_month ON site_am_sup_load_map(month_run_id);

CREATE TABLE IF NOT EXISTS fpd_driver_summary (
    month_run_id TEXT NOT NULL,
    driver_name TEXT NOT NULL,
    login_trips INTEGER NOT NULL,
    fps_count INTEGER NOT NULL,
    order_mismatch_count INTEGER NOT NULL,
    fpd_count INTEGER NOT NULL,
    percentage_of_fpds REAL NOT NULL,
    UNIQUE (month_run_id, driver_name)
);

CREATE TABLE IF NOT EXISTS spare_usage_summary (
    month_run_id TEXT NOT NULL,
    employee_id TEXT NOT NULL,
    driver_name TEXT NOT NULL,
    spare_usage_count INTEGER NOT NULL,
    UNIQUE (month_run_id, employee_id)
);

CREATE TABLE IF NOT EXISTS speed_violation_summary (
    month_run_id TEXT NOT NULL,
    driver_name TEXT NOT NULL,
    speed_violations REAL NOT NULL,
    UNIQUE (month_run_id, driver_name)
);

CREATE TABLE IF NOT EXISTS mileage_summary (
    month_run_id TEXT NOT NULL,
    vehicle_number TEXT NOT NULL,
    driver_name TEXT,
    ideal_mileage REAL,
    total_kms REAL,
    total_diesel REAL,
    average_mileage TEXT NOT NULL,
    variation TEXT NOT NULL,
    UNIQUE (month_run_id, vehicle_number)
);

CREATE TABLE IF NOT EXISTS driver_scorecard (
    month_run_id TEXT NOT NULL,
    driver_name TEXT NOT NULL,
    site_name TEXT,
    manager TEXT,
    supervisor TEXT,
    fpd_score INTEGER,
    spare_usage_score INTEGER,
    speed_violation_score INTEGER,
    incident_score INTEGER,
    cleaning_score INTEGER,
    mileage_score INTEGER,
    driver_score_total INTEGER NOT NULL,
    UNIQUE (month_run_id, driver_name)
);

CREATE TABLE IF NOT EXISTS supervisor_team_score (
    month_run_id TEXT NOT NULL,
    supervisor_name TEXT NOT NULL,
    driver_count INTEGER NOT NULL,
    average_driver_score REAL NOT NULL,
    UNIQUE (month_run_id, supervisor_name)
);
"#;
