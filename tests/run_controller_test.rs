// ==========================================
// 流水线编排器集成测试
// ==========================================
// 覆盖: 阶段失败即停止 / 已完成阶段不回滚 / 分块导入 / 清空批次
// ==========================================


use fleet_scorecard::config::PipelineSettings;
use fleet_scorecard::domain::{
    FpdSummary, MonthRunId, PipelineStage, RawTripFact, SpareUsageSummary,
};
use fleet_scorecard::engine::{RunController, StageOutcome};
use fleet_scorecard::repository::{
    Filter, PagedScan, RepositoryError, RepositoryResult, SqliteTableStore, TableRecord,
    TableStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_helpers::*;

// ==========================================
// FaultyStore - 指定表写入失败的存储包装
// ==========================================
struct FaultyStore {
    inner: SqliteTableStore,
    failing_table: Option<&'static str>,
    insert_calls: AtomicUsize,
}

impl FaultyStore {
    fn new(inner: SqliteTableStore, failing_table: Option<&'static str>) -> Self {
        Self {
            inner,
            failing_table,
            insert_calls: AtomicUsize::new(0),
        }
    }

    fn check(&self, table: &str) -> RepositoryResult<()> {
        if self.failing_table == Some(table) {
            return Err(RepositoryError::DatabaseQueryError(format!(
                "disk I/O error on {}",
                table
            )));
        }
        Ok(())
    }
}

impl TableStore for FaultyStore {
    fn select_page<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        filters: &[Filter],
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<T>> {
        self.inner.select_page(month_run_id, filters, offset, limit)
    }

    fn insert_batch<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> RepositoryResult<usize> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check(T::TABLE)?;
        self.inner.insert_batch(month_run_id, rows)
    }

    fn delete_where(
        &self,
        table: &str,
        month_run_id: &MonthRunId,
        filters: &[Filter],
    ) -> RepositoryResult<usize> {
        self.inner.delete_where(table, month_run_id, filters)
    }

    fn replace_month<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> RepositoryResult<usize> {
        self.check(T::TABLE)?;
        self.inner.replace_month(month_run_id, rows)
    }
}

fn controller(
    db_path: &str,
    failing_table: Option<&'static str>,
    settings: PipelineSettings,
) -> RunController<FaultyStore> {
    let inner = SqliteTableStore::from_connection(open_shared(db_path));
    RunController::new(Arc::new(FaultyStore::new(inner, failing_table)), settings)
}

fn run_id() -> MonthRunId {
    MonthRunId::parse("run-2024-06").unwrap()
}

fn count<T: TableRecord>(db_path: &str, id: &MonthRunId) -> usize {
    let store = SqliteTableStore::new(db_path).unwrap();
    PagedScan::<SqliteTableStore, T>::new(&store, id, 100)
        .for_each_row(|_| {})
        .unwrap()
}

#[test]
fn test_full_run_reports_every_stage() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let controller = controller(&db_path, None, PipelineSettings::default());
    let id = run_id();

    let report = controller.run_full(&id, &fleet_scenario());
    assert!(report.is_success());
    assert_eq!(report.stages.len(), PipelineStage::ORDERED.len());
    let stages: Vec<PipelineStage> = report.stages.iter().map(|r| r.stage).collect();
    assert_eq!(stages, PipelineStage::ORDERED.to_vec());
    assert_eq!(report.rows_inserted(PipelineStage::Fpd), Some(3));
    assert_eq!(report.rows_inserted(PipelineStage::SpareUsage), Some(3));
    assert_eq!(report.rows_inserted(PipelineStage::Mileage), Some(3));
    assert_eq!(report.rows_inserted(PipelineStage::DriverScorecard), Some(2));
    assert_eq!(report.rows_inserted(PipelineStage::TeamPerformance), Some(2));
}

#[test]
fn test_stage_failure_halts_and_keeps_earlier_results() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let controller = controller(
        &db_path,
        Some(SpareUsageSummary::TABLE),
        PipelineSettings::default(),
    );
    let id = run_id();

    let report = controller.run_full(&id, &fleet_scenario());
    assert!(!report.is_success());

    let error = report.error.clone().unwrap();
    assert!(error.contains("disk I/O error on spare_usage_summary"));

    assert_eq!(
        report.stages[0].outcome,
        StageOutcome::Inserted { rows_inserted: 3 }
    );
    assert_eq!(report.stages[1].stage, PipelineStage::SpareUsage);
    assert_eq!(
        report.stages[1].outcome,
        StageOutcome::Failed { error: error.clone() }
    );
    assert!(report.stages[2..]
        .iter()
        .all(|r| r.outcome == StageOutcome::Skipped));

    // FPD 结果保留，未回滚
    assert_eq!(count::<FpdSummary>(&db_path, &id), 3);
    assert_eq!(count::<SpareUsageSummary>(&db_path, &id), 0);
}

#[test]
fn test_import_failure_skips_all_stages() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let controller = controller(
        &db_path,
        Some(RawTripFact::TABLE),
        PipelineSettings::default(),
    );

    let report = controller.run_full(&run_id(), &fleet_scenario());
    assert!(!report.is_success());
    assert!(report.raw_counts.is_none());
    assert!(report
        .stages
        .iter()
        .all(|r| r.outcome == StageOutcome::Skipped));
}

#[test]
fn test_raw_import_is_chunked() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let settings = PipelineSettings {
        insert_chunk_size: 4,
        page_size: 3,
        ..PipelineSettings::default()
    };
    let inner = SqliteTableStore::from_connection(open_shared(&db_path));
    let store = Arc::new(FaultyStore::new(inner, None));
    let controller = RunController::new(store.clone(), settings);
    let id = run_id();

    let bundle = fleet_scenario();
    let counts = controller.import_raw(&id, &bundle).unwrap();
    assert_eq!(counts.trips, 19);
    assert_eq!(counts.spare_requests, 3);
    assert_eq!(counts.site_roster, 2);

    // 19 行出车按 4 分块 → 5 次；其余五类各 1 次
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 5 + 5);
    assert_eq!(count::<RawTripFact>(&db_path, &id), 19);
}

#[test]
fn test_rerun_replaces_instead_of_appending() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let controller = controller(&db_path, None, PipelineSettings::default());
    let id = run_id();

    controller.run_full(&id, &fleet_scenario());
    controller.run_full(&id, &fleet_scenario());
    let report = controller.recalculate(&id);

    assert!(report.is_success());
    assert_eq!(count::<RawTripFact>(&db_path, &id), 19);
    assert_eq!(count::<FpdSummary>(&db_path, &id), 3);
}

#[test]
fn test_clear_month_leaves_other_runs() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let controller = controller(&db_path, None, PipelineSettings::default());
    let june = run_id();
    let july = MonthRunId::parse("run-2024-07").unwrap();

    controller.run_full(&june, &fleet_scenario());
    controller.run_full(&july, &fleet_scenario());

    let deleted = controller.clear_month(&june).unwrap();
    assert!(deleted > 0);
    assert_eq!(count::<RawTripFact>(&db_path, &june), 0);
    assert_eq!(count::<FpdSummary>(&db_path, &june), 0);
    assert_eq!(count::<RawTripFact>(&db_path, &july), 19);
}
