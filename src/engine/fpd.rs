// ==========================================
// 车队司机评分系统 - FPD（首站准点）聚合器
// ==========================================
// 输入: operation_summary_report（trip_type 去空白后为 Login 的行）
// 输出: fpd_driver_summary（每司机一行，整表替换）
// 规则:
//   - 计划时间缺失/空值类 → 跳过该行
//   - Skip → FPS；Late(Order Mismatch) → 顺序不符；Late → FPD
//   - percentage_of_fpds = (FPS + 顺序不符 + FPD) / 登录数，以小数存储
// ==========================================

use crate::domain::{FirstPointVisit, FpdSummary, MonthRunId, RawTripFact, TRIP_TYPE_LOGIN};
use crate::engine::error::EngineResult;
use crate::engine::normalize::normalize_text;
use crate::repository::{PagedScan, TableStore};
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[derive(Debug, Default, Clone, Copy)]
struct LoginTally {
    logins: i64,
    fps: i64,
    order_mismatch: i64,
    fpd: i64,
}

/// 逐行累加的 FPD 统计
#[derive(Debug, Default)]
pub struct FpdTally {
    per_driver: BTreeMap<String, LoginTally>,
}

impl FpdTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一行出车记录（非 Login 行、空司机名、无计划时间均忽略）
    pub fn observe(&mut self, trip: &RawTripFact) {
        if trip.trip_type.as_deref().map(str::trim) != Some(TRIP_TYPE_LOGIN) {
            return;
        }
        let Some(driver) = trip.driver_name.as_deref().map(str::trim).filter(|d| !d.is_empty())
        else {
            return;
        };
        if normalize_text(trip.scheduled_start_end_time.as_deref()).is_none() {
            return;
        }

        let tally = self.per_driver.entry(driver.to_string()).or_default();
        tally.logins += 1;
        match FirstPointVisit::from_raw(trip.first_point_visit.as_deref()) {
            FirstPointVisit::Skip => tally.fps += 1,
            FirstPointVisit::LateOrderMismatch => tally.order_mismatch += 1,
            FirstPointVisit::Late => tally.fpd += 1,
            FirstPointVisit::OnTime => {}
        }
    }

    /// 输出汇总行（按司机名升序）
    pub fn finish(self) -> Vec<FpdSummary> {
        self.per_driver
            .into_iter()
            .map(|(driver_name, t)| {
                let mut row = FpdSummary {
                    driver_name,
                    login_trips: t.logins,
                    fps_count: t.fps,
                    order_mismatch_count: t.order_mismatch,
                    fpd_count: t.fpd,
                    percentage_of_fpds: 0.0,
                };
                if t.logins > 0 {
                    row.percentage_of_fpds = row.deviations() as f64 / t.logins as f64;
                }
                row
            })
            .collect()
    }
}

// ==========================================
// FpdAggregator
// ==========================================
pub struct FpdAggregator {
    page_size: usize,
}

impl FpdAggregator {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    /// 纯计算入口
    pub fn aggregate<'a>(trips: impl IntoIterator<Item = &'a RawTripFact>) -> Vec<FpdSummary> {
        let mut tally = FpdTally::new();
        trips.into_iter().for_each(|trip| tally.observe(trip));
        tally.finish()
    }

    /// 分页扫描出车记录并整表替换 fpd_driver_summary
    ///
    /// Login 判定统一在 FpdTally::observe 中完成（去空白后比较），不在 SQL 中预过滤
    ///
    /// # 返回
    /// 写入行数
    #[instrument(skip(self, store), fields(month_run_id = %month_run_id))]
    pub fn run<S: TableStore>(&self, store: &S, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let mut tally = FpdTally::new();
        let scanned = PagedScan::<S, RawTripFact>::new(store, month_run_id, self.page_size)
            .for_each_row(|trip| tally.observe(&trip))?;

        let rows = tally.finish();
        let inserted = store.replace_month(month_run_id, &rows)?;

        info!(scanned, inserted, "FPD 汇总完成");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(driver: &str, scheduled: Option<&str>, visit: Option<&str>) -> RawTripFact {
        RawTripFact {
            driver_name: Some(driver.to_string()),
            trip_type: Some(TRIP_TYPE_LOGIN.to_string()),
            scheduled_start_end_time: scheduled.map(str::to_string),
            first_point_visit: visit.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_and_percentage() {
        let trips = vec![
            login("E1 - Alice", Some("08:00-09:00"), None),
            login("E1 - Alice", Some("08:00-09:00"), Some("Late")),
            login("E1 - Alice", Some("08:00-09:00"), Some("Skip")),
            login("E1 - Alice", Some("08:00-09:00"), Some("Late(Order Mismatch)")),
        ];

        let rows = FpdAggregator::aggregate(&trips);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.driver_name, "E1 - Alice");
        assert_eq!(row.login_trips, 4);
        assert_eq!(row.fps_count, 1);
        assert_eq!(row.order_mismatch_count, 1);
        assert_eq!(row.fpd_count, 1);
        assert!((row.percentage_of_fpds - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_skips_blank_schedule_and_non_login() {
        let mut logout = login("E2 - Bob", Some("08:00"), Some("Late"));
        logout.trip_type = Some("Logout".to_string());

        let trips = vec![
            login("E2 - Bob", Some("NA"), Some("Late")),
            login("E2 - Bob", None, Some("Late")),
            login("E2 - Bob", Some(" - "), Some("Late")),
            login("E2 - Bob", Some("08:00"), None),
            login("   ", Some("08:00"), Some("Late")),
            logout,
        ];

        let rows = FpdAggregator::aggregate(&trips);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].login_trips, 1);
        assert_eq!(rows[0].fpd_count, 0);
        assert_eq!(rows[0].percentage_of_fpds, 0.0);
    }

    #[test]
    fn test_driver_name_trimmed_into_one_row() {
        let trips = vec![
            login("E3 - Carl", Some("x"), None),
            login(" E3 - Carl ", Some("x"), None),
        ];
        let rows = FpdAggregator::aggregate(&trips);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].login_trips, 2);
    }

    #[test]
    fn test_padded_trip_type_counts_as_login() {
        let mut padded = login("E4 - Dan", Some("08:00"), Some("Skip"));
        padded.trip_type = Some(" Login ".to_string());
        let trips = vec![padded, login("E4 - Dan", Some("08:00"), None)];

        let rows = FpdAggregator::aggregate(&trips);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].login_trips, 2);
        assert_eq!(rows[0].fps_count, 1);
    }
}
