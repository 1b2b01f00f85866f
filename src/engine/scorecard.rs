// ==========================================
// 车队司机评分系统 - 评分卡合成器
// ==========================================
// 输入: fpd_driver_summary（准入: 登录数 > 最小登录数）
//       spare_usage_summary / incident_report / cleaning_report（按身份）
//       speed_violation_summary / mileage_summary（按完整司机名）
//       operation_summary_report + site_am_sup_load_map（站点归属）
// 输出: driver_scorecard（每司机一行，整表替换）
// 红线: 分项缺失为空值，总分中按 0 计
// ==========================================

use crate::domain::{
    DriverIdentity, DriverScorecard, FpdSummary, MileageSummary, MonthRunId, RawCleaningFact,
    RawIncidentFact, RawTripFact, SiteRosterFact, SpareUsageSummary, SpeedViolationSummary,
};
use crate::engine::error::EngineResult;
use crate::engine::identity::{normalize_employee_id, resolve_identity};
use crate::engine::scoring;
use crate::engine::site_attribution::SiteAttribution;
use crate::repository::{PagedScan, TableStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

// ==========================================
// ComponentLookups - 分项原始值索引
// ==========================================
#[derive(Debug, Default)]
pub struct ComponentLookups {
    spare_usage: HashMap<DriverIdentity, i64>,
    speed_violations: HashMap<String, f64>,
    incident: HashMap<DriverIdentity, Option<f64>>,
    cleaning: HashMap<DriverIdentity, Option<f64>>,
    mileage_variation: HashMap<String, String>,
}

impl ComponentLookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_spare_usage(&mut self, row: &SpareUsageSummary) {
        if let Some(id) = normalize_employee_id(&row.employee_id) {
            self.spare_usage.insert(id, row.spare_usage_count);
        }
    }

    pub fn observe_speed(&mut self, row: &SpeedViolationSummary) {
        let driver = row.driver_name.trim();
        if !driver.is_empty() {
            self.speed_violations
                .insert(driver.to_string(), row.speed_violations);
        }
    }

    /// 同一工号多行时后者覆盖
    pub fn observe_incident(&mut self, row: &RawIncidentFact) {
        if let Some(id) = row.emp_id.as_deref().and_then(normalize_employee_id) {
            self.incident.insert(id, row.driver_incident_score);
        }
    }

    pub fn observe_cleaning(&mut self, row: &RawCleaningFact) {
        if let Some(id) = row.emp_id.as_deref().and_then(normalize_employee_id) {
            self.cleaning.insert(id, row.vehicle_exterior_score);
        }
    }

    /// 同一司机驾驶多车时取车牌序第一辆
    pub fn observe_mileage(&mut self, row: &MileageSummary) {
        let Some(driver) = row
            .driver_name
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        else {
            return;
        };
        self.mileage_variation
            .entry(driver.to_string())
            .or_insert_with(|| row.variation.trim().to_string());
    }

    fn spare_usage(&self, id: Option<&DriverIdentity>) -> Option<i64> {
        id.and_then(|id| self.spare_usage.get(id).copied())
    }

    fn incident(&self, id: Option<&DriverIdentity>) -> Option<f64> {
        id.and_then(|id| self.incident.get(id).copied().flatten())
    }

    fn cleaning(&self, id: Option<&DriverIdentity>) -> Option<f64> {
        id.and_then(|id| self.cleaning.get(id).copied().flatten())
    }

    /// 某司机各分项的原始输入（FPD 除外）
    pub fn inputs_for(&self, driver_name: &str) -> ComponentInputs {
        let driver = driver_name.trim();
        let identity = resolve_identity(driver);

        ComponentInputs {
            spare_usage_count: self.spare_usage(identity.as_ref()),
            speed_violations: self.speed_violations.get(driver).copied(),
            raw_incident_score: self.incident(identity.as_ref()),
            raw_cleaning_score: self.cleaning(identity.as_ref()),
            mileage_variation: self.mileage_variation.get(driver).cloned(),
        }
    }
}

/// 分项原始输入（缺失为 None）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentInputs {
    pub spare_usage_count: Option<i64>,
    pub speed_violations: Option<f64>,
    pub raw_incident_score: Option<f64>,
    pub raw_cleaning_score: Option<f64>,
    pub mileage_variation: Option<String>,
}

/// 分页读取各分项来源表并建立索引
pub fn load_lookups<S: TableStore>(
    store: &S,
    month_run_id: &MonthRunId,
    page_size: usize,
) -> EngineResult<ComponentLookups> {
    let mut lookups = ComponentLookups::new();
    PagedScan::<S, SpareUsageSummary>::new(store, month_run_id, page_size)
        .for_each_row(|row| lookups.observe_spare_usage(&row))?;
    PagedScan::<S, SpeedViolationSummary>::new(store, month_run_id, page_size)
        .for_each_row(|row| lookups.observe_speed(&row))?;
    PagedScan::<S, RawIncidentFact>::new(store, month_run_id, page_size)
        .for_each_row(|row| lookups.observe_incident(&row))?;
    PagedScan::<S, RawCleaningFact>::new(store, month_run_id, page_size)
        .for_each_row(|row| lookups.observe_cleaning(&row))?;
    PagedScan::<S, MileageSummary>::new(store, month_run_id, page_size)
        .for_each_row(|row| lookups.observe_mileage(&row))?;
    Ok(lookups)
}

// ==========================================
// ScorecardCombiner - 评分卡合成器
// ==========================================
pub struct ScorecardCombiner {
    page_size: usize,
    min_login_trips: i64,
}

impl ScorecardCombiner {
    /// # 参数
    /// - page_size: 分页大小
    /// - min_login_trips: 准入阈值，登录数必须严格大于该值
    pub fn new(page_size: usize, min_login_trips: i64) -> Self {
        Self {
            page_size,
            min_login_trips,
        }
    }

    /// 筛选准入司机（去空白后的司机名 → FPD 汇总行）
    pub fn eligible_drivers<'a>(
        &self,
        fpd_rows: impl IntoIterator<Item = &'a FpdSummary>,
    ) -> BTreeMap<String, &'a FpdSummary> {
        fpd_rows
            .into_iter()
            .filter(|row| row.login_trips > self.min_login_trips)
            .filter_map(|row| {
                let driver = row.driver_name.trim();
                (!driver.is_empty()).then(|| (driver.to_string(), row))
            })
            .collect()
    }

    /// 合成评分卡（纯计算）
    pub fn combine(
        eligible: &BTreeMap<String, &FpdSummary>,
        lookups: &ComponentLookups,
        sites: &SiteAttribution,
    ) -> Vec<DriverScorecard> {
        eligible
            .iter()
            .map(|(driver, fpd_row)| {
                let inputs = lookups.inputs_for(driver);
                let site = sites.assign(driver);

                let mut card = DriverScorecard {
                    driver_name: driver.clone(),
                    site_name: site.site_name,
                    manager: site.manager,
                    supervisor: site.supervisor,
                    fpd_score: scoring::score_fpd(fpd_row.deviations(), fpd_row.login_trips),
                    spare_usage_score: scoring::score_spare_usage(inputs.spare_usage_count),
                    speed_violation_score: scoring::score_speed_violations(inputs.speed_violations),
                    incident_score: scoring::score_incident(inputs.raw_incident_score),
                    cleaning_score: scoring::score_cleaning(inputs.raw_cleaning_score),
                    mileage_score: scoring::score_mileage(inputs.mileage_variation.as_deref()),
                    driver_score_total: 0,
                };
                card.driver_score_total = card.component_total();
                card
            })
            .collect()
    }

    #[instrument(skip(self, store), fields(month_run_id = %month_run_id))]
    pub fn run<S: TableStore>(&self, store: &S, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let mut fpd_rows = Vec::new();
        PagedScan::<S, FpdSummary>::new(store, month_run_id, self.page_size)
            .for_each_row(|row| fpd_rows.push(row))?;
        let eligible = self.eligible_drivers(&fpd_rows);
        debug!(
            fpd_rows = fpd_rows.len(),
            eligible = eligible.len(),
            "准入司机筛选完成"
        );

        let mut sites = SiteAttribution::for_drivers(eligible.keys().cloned());
        if !eligible.is_empty() {
            PagedScan::<S, RawTripFact>::new(store, month_run_id, self.page_size)
                .for_each_row(|trip| sites.observe_trip(&trip))?;
            PagedScan::<S, SiteRosterFact>::new(store, month_run_id, self.page_size)
                .for_each_row(|row| sites.observe_roster(&row))?;
        }

        let lookups = load_lookups(store, month_run_id, self.page_size)?;

        let cards = Self::combine(&eligible, &lookups, &sites);
        let inserted = store.replace_month(month_run_id, &cards)?;

        info!(inserted, "评分卡合成完成");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fpd(driver: &str, logins: i64, late: i64) -> FpdSummary {
        FpdSummary {
            driver_name: driver.to_string(),
            login_trips: logins,
            fpd_count: late,
            percentage_of_fpds: late as f64 / logins as f64,
            ..Default::default()
        }
    }

    #[test]
    fn test_exclusion_threshold() {
        let combiner = ScorecardCombiner::new(100, 4);
        let rows = vec![fpd("E1 - Four", 4, 0), fpd("E2 - Five", 5, 0)];
        let eligible = combiner.eligible_drivers(&rows);
        assert_eq!(eligible.len(), 1);
        assert!(eligible.contains_key("E2 - Five"));
    }

    #[test]
    fn test_null_components_contribute_zero() {
        let combiner = ScorecardCombiner::new(100, 4);
        // 9/100 恰好在 9% 阈值内
        let rows = [fpd("E1 - Alice", 100, 9)];
        let eligible = combiner.eligible_drivers(&rows);

        let mut lookups = ComponentLookups::new();
        lookups.observe_spare_usage(&SpareUsageSummary {
            employee_id: "E1".to_string(),
            driver_name: "E1 - Alice".to_string(),
            spare_usage_count: 3,
        });
        lookups.observe_speed(&SpeedViolationSummary {
            driver_name: "E1 - Alice".to_string(),
            speed_violations: 0.0,
        });
        lookups.observe_mileage(&MileageSummary {
            vehicle_number: "KA01".to_string(),
            driver_name: Some("E1 - Alice".to_string()),
            variation: "2.50%".to_string(),
            ..Default::default()
        });

        let cards = ScorecardCombiner::combine(&eligible, &lookups, &SiteAttribution::new());
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.fpd_score, Some(20));
        assert_eq!(card.spare_usage_score, Some(10));
        assert_eq!(card.speed_violation_score, Some(20));
        assert_eq!(card.mileage_score, Some(10));
        assert_eq!(card.incident_score, None);
        assert_eq!(card.cleaning_score, None);
        assert_eq!(card.driver_score_total, 60);
        assert_eq!(card.site_name, None);
    }

    #[test]
    fn test_employee_keyed_lookups_use_resolved_identity() {
        let combiner = ScorecardCombiner::new(100, 0);
        let rows = [fpd("NoHyphen", 1, 0)];
        let eligible = combiner.eligible_drivers(&rows);

        let mut lookups = ComponentLookups::new();
        lookups.observe_incident(&RawIncidentFact {
            emp_id: Some(" NoHyphen ".to_string()),
            driver_incident_score: Some(2.0),
        });
        lookups.observe_cleaning(&RawCleaningFact {
            emp_id: Some("NoHyphen".to_string()),
            vehicle_exterior_score: Some(1.0),
        });
        lookups.observe_cleaning(&RawCleaningFact {
            emp_id: Some("NoHyphen".to_string()),
            vehicle_exterior_score: Some(3.0),
        });

        let cards = ScorecardCombiner::combine(&eligible, &lookups, &SiteAttribution::new());
        assert_eq!(cards[0].incident_score, Some(10));
        assert_eq!(cards[0].cleaning_score, Some(10));
        assert_eq!(cards[0].driver_score_total, 20 + 10 + 10);
    }
}
