// ==========================================
// 车队司机评分系统 - 油耗聚合器
// ==========================================
// 输入: operation_summary_report（车辆 → 主驾驶员）
//       diesel_report（每车每月至多一行；重复时按写入顺序后者覆盖）
// 输出: mileage_summary（每车一行）
// 偏差分类（实际 m，标准 i）:
//   - 无油耗记录 / m 或 i 缺失 / i == 0 → "No diesel logs"
//   - m > i*1.5        → "Over Positive"
//   - i < m <= i*1.5   → "Positive"
//   - m == i           → "0%"
//   - m < i            → "<(i-m)/i*100 两位小数>%"
// ==========================================

use crate::domain::{MileageSummary, MonthRunId, RawDieselFact, RawTripFact};
use crate::engine::error::EngineResult;
use crate::engine::mode_counter::ModeCounter;
use crate::engine::normalize::trimmed_non_empty;
use crate::repository::{PagedScan, TableStore};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

pub const VARIATION_NO_DIESEL: &str = "No diesel logs";
pub const VARIATION_OVER_POSITIVE: &str = "Over Positive";
pub const VARIATION_POSITIVE: &str = "Positive";
pub const VARIATION_EXACT: &str = "0%";
pub const AVERAGE_NO_DIESEL: &str = "No Diesel logs";

/// 油耗偏差分类
///
/// # 参数
/// - actual: 实际油耗 m
/// - ideal: 标准油耗 i
pub fn classify_variation(actual: Option<f64>, ideal: Option<f64>) -> String {
    let (m, i) = match (actual, ideal) {
        (Some(m), Some(i)) if i != 0.0 => (m, i),
        _ => return VARIATION_NO_DIESEL.to_string(),
    };

    if m > i * 1.5 {
        VARIATION_OVER_POSITIVE.to_string()
    } else if m > i {
        VARIATION_POSITIVE.to_string()
    } else if m < i {
        format!("{:.2}%", (i - m) / i * 100.0)
    } else {
        VARIATION_EXACT.to_string()
    }
}

#[derive(Debug, Default)]
pub struct MileageTally {
    vehicles: BTreeSet<String>,
    drivers: ModeCounter<String, String>,
    diesel: BTreeMap<String, RawDieselFact>,
}

impl MileageTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_trip(&mut self, trip: &RawTripFact) {
        let Some(vehicle) = trimmed_non_empty(trip.vehicle_no.as_deref()) else {
            return;
        };
        if let Some(driver) = trimmed_non_empty(trip.driver_name.as_deref()) {
            self.drivers.observe(vehicle.clone(), driver);
        }
        self.vehicles.insert(vehicle);
    }

    pub fn observe_diesel(&mut self, diesel: RawDieselFact) {
        if let Some(vehicle) = trimmed_non_empty(diesel.vehicle_number.as_deref()) {
            self.diesel.insert(vehicle, diesel);
        }
    }

    /// 仅输出出车记录中出现过的车辆（按车牌升序）
    pub fn finish(self) -> Vec<MileageSummary> {
        let Self {
            vehicles,
            drivers,
            diesel,
        } = self;

        vehicles
            .into_iter()
            .map(|vehicle| {
                let log = diesel.get(&vehicle);
                let actual = log.and_then(|d| d.mileage);
                let ideal = log.and_then(|d| d.ideal_mileage);

                MileageSummary {
                    driver_name: drivers.mode(&vehicle),
                    ideal_mileage: ideal,
                    total_kms: log.and_then(|d| d.total_km),
                    total_diesel: log.and_then(|d| d.diesel_in_litres),
                    average_mileage: actual
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| AVERAGE_NO_DIESEL.to_string()),
                    variation: classify_variation(actual, ideal),
                    vehicle_number: vehicle,
                }
            })
            .collect()
    }
}

pub struct MileageAggregator {
    page_size: usize,
}

impl MileageAggregator {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn aggregate<'a>(
        trips: impl IntoIterator<Item = &'a RawTripFact>,
        diesel_logs: impl IntoIterator<Item = &'a RawDieselFact>,
    ) -> Vec<MileageSummary> {
        let mut tally = MileageTally::new();
        trips.into_iter().for_each(|t| tally.observe_trip(t));
        diesel_logs
            .into_iter()
            .for_each(|d| tally.observe_diesel(d.clone()));
        tally.finish()
    }

    #[instrument(skip(self, store), fields(month_run_id = %month_run_id))]
    pub fn run<S: TableStore>(&self, store: &S, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let mut tally = MileageTally::new();

        let trips = PagedScan::<S, RawTripFact>::new(store, month_run_id, self.page_size)
            .for_each_row(|trip| tally.observe_trip(&trip))?;
        let diesel = PagedScan::<S, RawDieselFact>::new(store, month_run_id, self.page_size)
            .for_each_row(|log| tally.observe_diesel(log))?;

        let inserted = store.replace_month(month_run_id, &tally.finish())?;

        info!(trips, diesel, inserted, "油耗汇总完成");
        Ok(inserted)
    }
}
