// ==========================================
// 仓储层集成测试
// ==========================================
// 覆盖: 分页读取 / 过滤删除 / 整表替换 / 分区隔离 / 月度批次
// ==========================================


use chrono::NaiveDate;
use fleet_scorecard::domain::{
    MonthRunId, MonthRunStatus, RawIncidentFact, RawTripFact, TRIP_TYPE_LOGIN,
};
use fleet_scorecard::repository::{
    Filter, MonthRunRepository, PagedScan, RepositoryError, SqliteTableStore, TableStore,
};
use test_helpers::*;

fn id(raw: &str) -> MonthRunId {
    MonthRunId::parse(raw).unwrap()
}

fn scan_trips(store: &SqliteTableStore, month_run_id: &MonthRunId, page_size: usize) -> Vec<RawTripFact> {
    let mut rows = Vec::new();
    PagedScan::<SqliteTableStore, RawTripFact>::new(store, month_run_id, page_size)
        .for_each_row(|row| rows.push(row))
        .unwrap();
    rows
}

#[test]
fn test_paged_scan_reads_all_rows_in_insert_order() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let store = SqliteTableStore::new(&db_path).unwrap();
    let run = id("run-a");

    let trips: Vec<RawTripFact> = (0..7)
        .map(|i| login_trip(&format!("E{} - D", i), None, "KA01", "North Hub"))
        .collect();
    assert_eq!(store.insert_batch(&run, &trips).unwrap(), 7);

    // 页大小 3 → 3 + 3 + 1
    let rows = scan_trips(&store, &run, 3);
    assert_eq!(rows, trips);

    // 页大小恰好整除时多读一个空页结束
    let mut scan = PagedScan::<SqliteTableStore, RawTripFact>::new(&store, &run, 7);
    assert_eq!(scan.next_page().unwrap().unwrap().len(), 7);
    assert!(scan.next_page().unwrap().is_none());
}

#[test]
fn test_filtered_scan_and_delete() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let store = SqliteTableStore::new(&db_path).unwrap();
    let run = id("run-a");

    let mut logout = login_trip("E1 - A", None, "KA01", "North Hub");
    logout.trip_type = Some("Logout".to_string());
    let rows = vec![
        login_trip("E1 - A", None, "KA01", "North Hub"),
        logout,
        login_trip("E2 - B", None, "KA02", "North Hub"),
    ];
    store.insert_batch(&run, &rows).unwrap();

    let mut logins = Vec::new();
    PagedScan::<SqliteTableStore, RawTripFact>::new(&store, &run, 10)
        .with_filter(Filter::eq("trip_type", TRIP_TYPE_LOGIN))
        .for_each_row(|row| logins.push(row))
        .unwrap();
    assert_eq!(logins.len(), 2);

    let deleted = store
        .delete_where(
            "operation_summary_report",
            &run,
            &[Filter::eq("trip_type", "Logout")],
        )
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(scan_trips(&store, &run, 10).len(), 2);
}

#[test]
fn test_replace_month_is_scoped_to_partition() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let store = SqliteTableStore::new(&db_path).unwrap();
    let june = id("run-june");
    let july = id("run-july");

    store
        .insert_batch(&june, &[incident("E1", 3.0), incident("E2", 2.0)])
        .unwrap();
    store.insert_batch(&july, &[incident("E1", 1.0)]).unwrap();

    let replaced = store
        .replace_month(&june, &[incident("E9", 0.0)])
        .unwrap();
    assert_eq!(replaced, 1);

    let mut june_rows = Vec::new();
    PagedScan::<SqliteTableStore, RawIncidentFact>::new(&store, &june, 10)
        .for_each_row(|row| june_rows.push(row))
        .unwrap();
    assert_eq!(june_rows, vec![incident("E9", 0.0)]);

    let mut july_rows = Vec::new();
    PagedScan::<SqliteTableStore, RawIncidentFact>::new(&store, &july, 10)
        .for_each_row(|row| july_rows.push(row))
        .unwrap();
    assert_eq!(july_rows, vec![incident("E1", 1.0)]);
}

#[test]
fn test_null_columns_round_trip_as_none() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let store = SqliteTableStore::new(&db_path).unwrap();
    let run = id("run-a");

    let sparse = RawTripFact {
        driver_name: Some("E1 - A".to_string()),
        ..Default::default()
    };
    store.insert_batch(&run, std::slice::from_ref(&sparse)).unwrap();
    assert_eq!(scan_trips(&store, &run, 10), vec![sparse]);
}

#[test]
fn test_unknown_table_is_rejected() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let store = SqliteTableStore::new(&db_path).unwrap();

    let result = store.delete_where("month_runs", &id("run-a"), &[]);
    assert!(matches!(result, Err(RepositoryError::UnknownTable(_))));
}

#[test]
fn test_month_run_find_or_create_is_unique_per_month() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = MonthRunRepository::new(&db_path).unwrap();
    let may = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let first = repo.find_or_create(may).unwrap();
    let second = repo.find_or_create(may).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.status, MonthRunStatus::RawLoaded);

    repo.update_status(&first.id, MonthRunStatus::Scored).unwrap();
    let found = repo.find_by_month(may).unwrap().unwrap();
    assert_eq!(found.status, MonthRunStatus::Scored);

    let june = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert!(repo.find_by_month(june).unwrap().is_none());
    assert_ne!(repo.find_or_create(june).unwrap().id, first.id);
}
