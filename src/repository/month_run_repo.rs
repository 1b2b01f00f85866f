// ==========================================
// 车队司机评分系统 - 月度批次数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: month_runs 表的查询/创建/状态更新（按月首日唯一）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{normalize_to_month, MonthRun, MonthRunId, MonthRunStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// MonthRunRepository - 月度批次仓储
// ==========================================
pub struct MonthRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MonthRunRepository {
    /// 创建新的 MonthRunRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按月查询批次（任意日期会先规范化为月首日）
    ///
    /// # 返回
    /// - Ok(Some(MonthRun)): 找到批次
    /// - Ok(None): 该月尚未导入
    pub fn find_by_month(&self, month: NaiveDate) -> RepositoryResult<Option<MonthRun>> {
        let month = normalize_to_month(month);
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                "SELECT id, month, status, created_at, updated_at FROM month_runs WHERE month = ?1 LIMIT 1",
                params![month.format("%Y-%m-%d").to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(map_month_run).transpose()
    }

    /// 按 ID 查询批次
    pub fn find_by_id(&self, id: &MonthRunId) -> RepositoryResult<Option<MonthRun>> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                "SELECT id, month, status, created_at, updated_at FROM month_runs WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(map_month_run).transpose()
    }

    /// 查询或创建批次
    ///
    /// 已存在则原样返回（保留原 ID，重导入复用同一分区）；
    /// 不存在则以 UUID v4 新建，状态为 raw_loaded
    pub fn find_or_create(&self, month: NaiveDate) -> RepositoryResult<MonthRun> {
        if let Some(existing) = self.find_by_month(month)? {
            return Ok(existing);
        }

        let now = Utc::now().naive_utc();
        let run = MonthRun {
            id: MonthRunId::parse(&Uuid::new_v4().to_string()).ok_or_else(|| {
                RepositoryError::InternalError("生成批次ID失败".to_string())
            })?,
            month: normalize_to_month(month),
            status: MonthRunStatus::RawLoaded,
            created_at: now,
            updated_at: now,
        };

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO month_runs (id, month, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run.id.as_str(),
                run.month.format("%Y-%m-%d").to_string(),
                run.status.to_string(),
                run.created_at.format(DATETIME_FORMAT).to_string(),
                run.updated_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;

        Ok(run)
    }

    /// 更新批次状态
    pub fn update_status(&self, id: &MonthRunId, status: MonthRunStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            "UPDATE month_runs SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.to_string(),
                Utc::now().naive_utc().format(DATETIME_FORMAT).to_string(),
                id.as_str(),
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "MonthRun".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_month_run(
    (id, month, status, created_at, updated_at): (String, String, String, String, String),
) -> RepositoryResult<MonthRun> {
    let field_err = |field: &str, value: &str| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("无法解析: {}", value),
    };

    Ok(MonthRun {
        id: MonthRunId::parse(&id).ok_or_else(|| field_err("id", &id))?,
        month: NaiveDate::parse_from_str(&month, "%Y-%m-%d").map_err(|_| field_err("month", &month))?,
        status: MonthRunStatus::parse(&status).ok_or_else(|| field_err("status", &status))?,
        created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FORMAT)
            .map_err(|_| field_err("created_at", &created_at))?,
        updated_at: NaiveDateTime::parse_from_str(&updated_at, DATETIME_FORMAT)
            .map_err(|_| field_err("updated_at", &updated_at))?,
    })
}
