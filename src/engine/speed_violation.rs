// ==========================================
// 车队司机评分系统 - 超速聚合器
// ==========================================
// 输入: operation_summary_report（全部行）
// 输出: speed_violation_summary（每司机一行）
// 规则: 非数值/空值类的超速字段按 0 计
// ==========================================

use crate::domain::{MonthRunId, RawTripFact, SpeedViolationSummary};
use crate::engine::error::EngineResult;
use crate::engine::normalize::parse_number;
use crate::repository::{PagedScan, TableStore};
use std::collections::BTreeMap;
use tracing::{info, instrument};

pub struct SpeedViolationAggregator {
    page_size: usize,
}

impl SpeedViolationAggregator {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    fn observe(totals: &mut BTreeMap<String, f64>, trip: &RawTripFact) {
        let Some(driver) = trip.driver_name.as_deref().map(str::trim).filter(|d| !d.is_empty())
        else {
            return;
        };
        let violations = parse_number(trip.speed_violation.as_deref()).unwrap_or(0.0);
        *totals.entry(driver.to_string()).or_insert(0.0) += violations;
    }

    fn into_rows(totals: BTreeMap<String, f64>) -> Vec<SpeedViolationSummary> {
        totals
            .into_iter()
            .map(|(driver_name, speed_violations)| SpeedViolationSummary {
                driver_name,
                speed_violations,
            })
            .collect()
    }

    pub fn aggregate<'a>(
        trips: impl IntoIterator<Item = &'a RawTripFact>,
    ) -> Vec<SpeedViolationSummary> {
        let mut totals = BTreeMap::new();
        trips.into_iter().for_each(|trip| Self::observe(&mut totals, trip));
        Self::into_rows(totals)
    }

    #[instrument(skip(self, store), fields(month_run_id = %month_run_id))]
    pub fn run<S: TableStore>(&self, store: &S, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let mut totals = BTreeMap::new();
        let scanned = PagedScan::<S, RawTripFact>::new(store, month_run_id, self.page_size)
            .for_each_row(|trip| Self::observe(&mut totals, &trip))?;

        let inserted = store.replace_month(month_run_id, &Self::into_rows(totals))?;

        info!(scanned, inserted, "超速汇总完成");
        Ok(inserted)
    }
}
