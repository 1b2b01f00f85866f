// ==========================================
// 车队司机评分系统 - 备用车使用聚合器
// ==========================================
// 输入: operation_summary_report（司机名 → 身份 → 显示名）
//       spare_utilization_report（按工号计数）
// 输出: spare_usage_summary（每个身份一行，任一来源出现即输出）
// 规则:
//   - 显示名取该身份出现次数最多的完整司机名，无则 "not found"
//   - 仅作为司机出现、无备用车申请 → 计数 0
// ==========================================

use crate::domain::{DriverIdentity, MonthRunId, RawSpareFact, RawTripFact, SpareUsageSummary};
use crate::engine::error::EngineResult;
use crate::engine::identity::{normalize_employee_id, resolve_identity};
use crate::engine::mode_counter::ModeCounter;
use crate::engine::normalize::normalize_text;
use crate::repository::{PagedScan, TableStore};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// 显示名缺失时的占位
pub const NAME_NOT_FOUND: &str = "not found";

#[derive(Debug, Default)]
pub struct SpareUsageTally {
    names: ModeCounter<DriverIdentity, String>,
    counts: BTreeMap<DriverIdentity, i64>,
}

impl SpareUsageTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个司机名（登记身份并统计显示名）
    pub fn observe_trip(&mut self, trip: &RawTripFact) {
        let Some(name) = normalize_text(trip.driver_name.as_deref()) else {
            return;
        };
        let Some(identity) = resolve_identity(&name) else {
            return;
        };
        self.counts.entry(identity.clone()).or_insert(0);
        self.names.observe(identity, name);
    }

    /// 记录一条备用车申请
    pub fn observe_spare(&mut self, spare: &RawSpareFact) {
        let Some(identity) = normalize_text(spare.scheduled_employee_id.as_deref())
            .and_then(|id| normalize_employee_id(&id))
        else {
            return;
        };
        *self.counts.entry(identity).or_insert(0) += 1;
    }

    pub fn finish(self) -> Vec<SpareUsageSummary> {
        let names = self.names;
        self.counts
            .into_iter()
            .map(|(identity, spare_usage_count)| {
                let driver_name = names.mode(&identity).unwrap_or_else(|| {
                    warn!(employee_id = %identity, "备用车申请工号无对应司机名");
                    NAME_NOT_FOUND.to_string()
                });
                SpareUsageSummary {
                    employee_id: identity.as_str().to_string(),
                    driver_name,
                    spare_usage_count,
                }
            })
            .collect()
    }
}

pub struct SpareUsageAggregator {
    page_size: usize,
}

impl SpareUsageAggregator {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn aggregate<'a>(
        trips: impl IntoIterator<Item = &'a RawTripFact>,
        spares: impl IntoIterator<Item = &'a RawSpareFact>,
    ) -> Vec<SpareUsageSummary> {
        let mut tally = SpareUsageTally::new();
        trips.into_iter().for_each(|t| tally.observe_trip(t));
        spares.into_iter().for_each(|s| tally.observe_spare(s));
        tally.finish()
    }

    #[instrument(skip(self, store), fields(month_run_id = %month_run_id))]
    pub fn run<S: TableStore>(&self, store: &S, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let mut tally = SpareUsageTally::new();

        let trips = PagedScan::<S, RawTripFact>::new(store, month_run_id, self.page_size)
            .for_each_row(|trip| tally.observe_trip(&trip))?;
        let spares = PagedScan::<S, RawSpareFact>::new(store, month_run_id, self.page_size)
            .for_each_row(|spare| tally.observe_spare(&spare))?;

        let inserted = store.replace_month(month_run_id, &tally.finish())?;

        info!(trips, spares, inserted, "备用车汇总完成");
        Ok(inserted)
    }
}
