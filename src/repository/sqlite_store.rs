// ==========================================
// 车队司机评分系统 - SQLite 表存储实现
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有值参数化；表名只允许已登记的月度表
// ==========================================

use crate::db::{open_sqlite_connection, DERIVED_TABLES, RAW_FACT_TABLES};
use crate::domain::MonthRunId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{
    build_delete_sql, build_insert_sql, build_select_page_sql,
};
use crate::repository::table_store::{Filter, TableRecord, TableStore};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteTableStore - 通用表存储（SQLite）
// ==========================================
pub struct SqliteTableStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTableStore {
    /// 创建新的 SqliteTableStore 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建存储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 校验表名（只允许登记过的月度表）
    fn ensure_known_table(table: &str) -> RepositoryResult<()> {
        if RAW_FACT_TABLES.contains(&table) || DERIVED_TABLES.contains(&table) {
            Ok(())
        } else {
            Err(RepositoryError::UnknownTable(table.to_string()))
        }
    }

    fn filter_columns(filters: &[Filter]) -> Vec<&str> {
        filters.iter().map(|f| f.column).collect()
    }

    fn partition_params(month_run_id: &MonthRunId, filters: &[Filter]) -> Vec<Value> {
        std::iter::once(Value::Text(month_run_id.as_str().to_string()))
            .chain(filters.iter().map(|f| f.value.clone()))
            .collect()
    }

    fn insert_rows<T: TableRecord>(
        conn: &Connection,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> RepositoryResult<usize> {
        let sql = build_insert_sql(T::TABLE, T::COLUMNS);
        let mut stmt = conn.prepare_cached(&sql)?;

        let mut count = 0;
        for row in rows {
            let values = std::iter::once(Value::Text(month_run_id.as_str().to_string()))
                .chain(row.to_values());
            stmt.execute(params_from_iter(values))?;
            count += 1;
        }
        Ok(count)
    }
}

impl TableStore for SqliteTableStore {
    fn select_page<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        filters: &[Filter],
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<T>> {
        Self::ensure_known_table(T::TABLE)?;
        let conn = self.get_conn()?;

        let sql = build_select_page_sql(T::TABLE, T::COLUMNS, &Self::filter_columns(filters));
        let mut params = Self::partition_params(month_run_id, filters);
        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));

        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| T::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// 批量插入（单事务）
    fn insert_batch<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> RepositoryResult<usize> {
        Self::ensure_known_table(T::TABLE)?;
        if rows.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let count = Self::insert_rows(&tx, month_run_id, rows)?;
        tx.commit()?;
        Ok(count)
    }

    fn delete_where(
        &self,
        table: &str,
        month_run_id: &MonthRunId,
        filters: &[Filter],
    ) -> RepositoryResult<usize> {
        Self::ensure_known_table(table)?;
        let conn = self.get_conn()?;

        let sql = build_delete_sql(table, &Self::filter_columns(filters));
        let deleted = conn.execute(&sql, params_from_iter(Self::partition_params(month_run_id, filters)))?;
        Ok(deleted)
    }

    /// 整表替换（删除 + 写入在同一事务内）
    fn replace_month<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> RepositoryResult<usize> {
        Self::ensure_known_table(T::TABLE)?;
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            &build_delete_sql(T::TABLE, &[]),
            [month_run_id.as_str()],
        )?;
        let count = Self::insert_rows(&tx, month_run_id, rows)?;

        tx.commit()?;
        Ok(count)
    }
}
