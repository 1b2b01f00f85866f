// ==========================================
// 车队司机评分系统 - SQL 构建工具模块
// ==========================================
// 职责: 为通用表存储生成分区查询/写入/删除语句
// 约束: 表名与列名只来自代码常量（TableRecord），值一律参数化
// ==========================================

/// 分区列（所有月度表共有）
pub const PARTITION_COLUMN: &str = "month_run_id";

/// 构建分区过滤 WHERE 子句
///
/// 第一个占位符固定为 month_run_id，其后依次为等值过滤列
///
/// # 示例
/// ```
/// use fleet_scorecard::repository::sql_builder::build_where_clause;
///
/// assert_eq!(build_where_clause(&[]), "month_run_id = ?1");
/// assert_eq!(
///     build_where_clause(&["trip_type"]),
///     "month_run_id = ?1 AND trip_type = ?2"
/// );
/// ```
pub fn build_where_clause(filter_columns: &[&str]) -> String {
    let mut clause = format!("{} = ?1", PARTITION_COLUMN);
    for (idx, column) in filter_columns.iter().enumerate() {
        clause.push_str(&format!(" AND {} = ?{}", column, idx + 2));
    }
    clause
}

/// 构建分页读取语句（按 rowid 稳定排序）
///
/// # 示例
/// ```
/// use fleet_scorecard::repository::sql_builder::build_select_page_sql;
///
/// let sql = build_select_page_sql("diesel_report", &["vehicle_number", "mileage"], &[]);
/// assert_eq!(
///     sql,
///     "SELECT vehicle_number, mileage FROM diesel_report WHERE month_run_id = ?1 ORDER BY rowid LIMIT ?2 OFFSET ?3"
/// );
/// ```
pub fn build_select_page_sql(table: &str, columns: &[&str], filter_columns: &[&str]) -> String {
    let next = filter_columns.len() + 2;
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY rowid LIMIT ?{} OFFSET ?{}",
        columns.join(", "),
        table,
        build_where_clause(filter_columns),
        next,
        next + 1
    )
}

/// 构建带分区列的批量插入语句
///
/// # 示例
/// ```
/// use fleet_scorecard::repository::sql_builder::build_insert_sql;
///
/// let sql = build_insert_sql("incident_report", &["emp_id", "driver_incident_score"]);
/// assert_eq!(
///     sql,
///     "INSERT INTO incident_report (month_run_id, emp_id, driver_incident_score) VALUES (?1, ?2, ?3)"
/// );
/// ```
pub fn build_insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len() + 1)
        .map(|idx| format!("?{}", idx))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}, {}) VALUES ({})",
        table,
        PARTITION_COLUMN,
        columns.join(", "),
        placeholders
    )
}

/// 构建分区删除语句
///
/// # 示例
/// ```
/// use fleet_scorecard::repository::sql_builder::build_delete_sql;
///
/// assert_eq!(
///     build_delete_sql("driver_scorecard", &[]),
///     "DELETE FROM driver_scorecard WHERE month_run_id = ?1"
/// );
/// ```
pub fn build_delete_sql(table: &str, filter_columns: &[&str]) -> String {
    format!("DELETE FROM {} WHERE {}", table, build_where_clause(filter_columns))
}
