// ==========================================
// 车队司机评分系统 - 评分卡 API
// ==========================================
// 职责:
//   1. 按 (年, 月) 定位月度批次（月首日唯一）
//   2. 全量导入运行 / 重算 / 单阶段调用
//   3. 评分卡查询（含各分项原始输入）
// 约定: 输入校验失败时不做任何写入
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, PipelineSettings};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::month_run::{MAX_YEAR, MIN_YEAR};
use crate::domain::{
    first_of_month, DriverScorecard, FpdSummary, MonthRun, MonthRunId, MonthRunStatus,
    PipelineStage, RawFactBundle,
};
use crate::engine::{load_lookups, ComponentInputs, RunController, RunReport};
use crate::repository::{MonthRunRepository, PagedScan, SqliteTableStore};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// 请求 / 响应结构
// ==========================================

/// 单阶段调用请求: { "month_run_id": "<id>" }
#[derive(Debug, Clone, Deserialize)]
pub struct StageRequest {
    #[serde(default)]
    pub month_run_id: Option<String>,
}

/// 单阶段调用成功响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResponse {
    pub month_run_id: MonthRunId,
    pub rows_inserted: usize,
}

/// 评分卡一行（含原始输入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardEntry {
    #[serde(flatten)]
    pub card: DriverScorecard,
    pub login_trips: Option<i64>,
    pub percentage_of_fpds: Option<f64>,
    #[serde(flatten)]
    pub inputs: ComponentInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardView {
    pub month_run_id: MonthRunId,
    pub month: NaiveDate,
    pub status: MonthRunStatus,
    pub entries: Vec<ScorecardEntry>, // 按总分降序，同分按司机名升序
}

// ==========================================
// ScorecardApi
// ==========================================
pub struct ScorecardApi {
    store: Arc<SqliteTableStore>,
    month_runs: MonthRunRepository,
    config: ConfigManager,
}

impl ScorecardApi {
    /// 打开数据库并确保表结构存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建（调用方负责初始化表结构）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            store: Arc::new(SqliteTableStore::from_connection(conn.clone())),
            month_runs: MonthRunRepository::from_connection(conn.clone()),
            config: ConfigManager::from_connection(conn),
        }
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    fn controller(&self) -> ApiResult<RunController<SqliteTableStore>> {
        let settings = self.config.load_pipeline_settings()?;
        Ok(RunController::new(self.store.clone(), settings))
    }

    fn find_month_run(&self, year: i32, month: u32) -> ApiResult<MonthRun> {
        let date = validate_month(year, month)?;
        self.month_runs
            .find_by_month(date)?
            .ok_or_else(|| ApiError::NotFound(format!("{} 月度批次", date.format("%Y-%m"))))
    }

    fn finish_run(&self, report: &RunReport) -> ApiResult<()> {
        let status = if report.is_success() {
            MonthRunStatus::Scored
        } else {
            MonthRunStatus::Failed
        };
        self.month_runs.update_status(&report.month_run_id, status)?;
        info!(
            month_run_id = %report.month_run_id,
            %status,
            elapsed_ms = report.elapsed_ms,
            "月度批次运行结束"
        );
        Ok(())
    }

    /// 全量运行: 定位/创建批次 → 清空 → 导入 → 全部阶段
    ///
    /// # 返回
    /// 运行报告（阶段失败体现在报告中，不作为 Err 返回）
    #[instrument(skip(self, bundle))]
    pub fn import_month(&self, year: i32, month: u32, bundle: &RawFactBundle) -> ApiResult<RunReport> {
        let date = validate_month(year, month)?;
        let controller = self.controller()?;

        let run = self.month_runs.find_or_create(date)?;
        let report = controller.run_full(&run.id, bundle);
        self.finish_run(&report)?;
        Ok(report)
    }

    /// 重算: 对已存在的批次重跑全部阶段（不重新导入）
    #[instrument(skip(self))]
    pub fn recalculate(&self, year: i32, month: u32) -> ApiResult<RunReport> {
        let run = self.find_month_run(year, month)?;
        self.recalculate_run(&run.id)
    }

    /// 按批次ID重算
    pub fn recalculate_run(&self, month_run_id: &MonthRunId) -> ApiResult<RunReport> {
        let controller = self.controller()?;
        if self.month_runs.find_by_id(month_run_id)?.is_none() {
            return Err(ApiError::NotFound(format!("月度批次 {}", month_run_id)));
        }

        let report = controller.recalculate(month_run_id);
        self.finish_run(&report)?;
        Ok(report)
    }

    /// 单阶段调用
    ///
    /// 请求 { "month_run_id": "<id>" }；
    /// 成功 { "month_run_id", "rows_inserted" }，失败 { "error": "<message>" }
    pub fn invoke_stage(&self, stage: PipelineStage, request: &JsonValue) -> JsonValue {
        match self.try_invoke_stage(stage, request) {
            Ok(response) => json!(response),
            Err(e) => {
                warn!(%stage, error = %e, "单阶段调用失败");
                json!({ "error": e.to_string() })
            }
        }
    }

    fn try_invoke_stage(&self, stage: PipelineStage, request: &JsonValue) -> ApiResult<StageResponse> {
        let request: StageRequest = serde_json::from_value(request.clone())
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        let month_run_id = request
            .month_run_id
            .as_deref()
            .and_then(MonthRunId::parse)
            .ok_or_else(|| ApiError::InvalidInput("month_run_id is required".to_string()))?;

        let controller = self.controller()?;
        if self.month_runs.find_by_id(&month_run_id)?.is_none() {
            return Err(ApiError::NotFound(format!("月度批次 {}", month_run_id)));
        }

        let rows_inserted = controller.run_stage(stage, &month_run_id)?;
        Ok(StageResponse {
            month_run_id,
            rows_inserted,
        })
    }

    /// 评分卡查询
    pub fn get_scorecard(&self, year: i32, month: u32) -> ApiResult<ScorecardView> {
        let run = self.find_month_run(year, month)?;
        let settings: PipelineSettings = self.config.load_pipeline_settings()?;
        let store = self.store.as_ref();

        let mut fpd: HashMap<String, FpdSummary> = HashMap::new();
        PagedScan::<SqliteTableStore, FpdSummary>::new(store, &run.id, settings.page_size)
            .for_each_row(|row| {
                fpd.insert(row.driver_name.trim().to_string(), row);
            })?;
        let lookups = load_lookups(store, &run.id, settings.page_size)?;

        let mut entries = Vec::new();
        PagedScan::<SqliteTableStore, DriverScorecard>::new(store, &run.id, settings.page_size)
            .for_each_row(|card| {
                let fpd_row = fpd.get(card.driver_name.trim());
                entries.push(ScorecardEntry {
                    login_trips: fpd_row.map(|r| r.login_trips),
                    percentage_of_fpds: fpd_row.map(|r| r.percentage_of_fpds),
                    inputs: lookups.inputs_for(&card.driver_name),
                    card,
                });
            })?;

        entries.sort_by(|a, b| {
            b.card
                .driver_score_total
                .cmp(&a.card.driver_score_total)
                .then_with(|| a.card.driver_name.cmp(&b.card.driver_name))
        });

        Ok(ScorecardView {
            month_run_id: run.id,
            month: run.month,
            status: run.status,
            entries,
        })
    }
}

/// 校验年月并返回月首日
pub fn validate_month(year: i32, month: u32) -> ApiResult<NaiveDate> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ApiError::InvalidInput(format!(
            "年份必须在 {}-{} 之间: {}",
            MIN_YEAR, MAX_YEAR, year
        )));
    }
    first_of_month(year, month)
        .ok_or_else(|| ApiError::InvalidInput(format!("月份必须在 1-12 之间: {}", month)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_month() {
        assert_eq!(
            validate_month(2024, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert!(matches!(validate_month(2024, 0), Err(ApiError::InvalidInput(_))));
        assert!(matches!(validate_month(2024, 13), Err(ApiError::InvalidInput(_))));
        assert!(matches!(validate_month(1999, 1), Err(ApiError::InvalidInput(_))));
        assert!(matches!(validate_month(2101, 1), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_invoke_stage_requires_month_run_id() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let api = ScorecardApi::from_connection(Arc::new(Mutex::new(conn)));

        let response = api.invoke_stage(PipelineStage::Fpd, &json!({ "month_run_id": "  " }));
        assert_eq!(response["error"], "无效输入: month_run_id is required");

        let response = api.invoke_stage(PipelineStage::Fpd, &json!({}));
        assert!(response["error"].is_string());

        let response = api.invoke_stage(PipelineStage::Fpd, &json!({ "month_run_id": "nope" }));
        assert!(response["error"].as_str().unwrap().contains("nope"));
    }
}
