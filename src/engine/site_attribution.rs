// ==========================================
// 车队司机评分系统 - 站点归属
// ==========================================
// 职责: 司机 → 出现最多的站点 (corp_name) → 站点花名册的经理/主管
// 规则: 查无结果返回空值，不报错
// ==========================================

use crate::domain::{RawTripFact, SiteRosterFact};
use crate::engine::mode_counter::ModeCounter;
use crate::engine::normalize::trimmed_non_empty;
use std::collections::{HashMap, HashSet};

/// 司机的站点归属结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteAssignment {
    pub site_name: Option<String>,
    pub manager: Option<String>,
    pub supervisor: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct RosterEntry {
    manager: Option<String>,
    supervisor: Option<String>,
}

#[derive(Debug, Default)]
pub struct SiteAttribution {
    drivers: Option<HashSet<String>>,
    sites: ModeCounter<String, String>,
    roster: HashMap<String, RosterEntry>,
}

impl SiteAttribution {
    /// 统计全部司机
    pub fn new() -> Self {
        Self::default()
    }

    /// 只统计给定司机（其余出车记录忽略）
    pub fn for_drivers(drivers: impl IntoIterator<Item = String>) -> Self {
        Self {
            drivers: Some(drivers.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn observe_trip(&mut self, trip: &RawTripFact) {
        let Some(driver) = trimmed_non_empty(trip.driver_name.as_deref()) else {
            return;
        };
        if let Some(wanted) = &self.drivers {
            if !wanted.contains(&driver) {
                return;
            }
        }
        if let Some(site) = trimmed_non_empty(trip.corp_name.as_deref()) {
            self.sites.observe(driver, site);
        }
    }

    /// 登记花名册（同名站点后者覆盖）
    pub fn observe_roster(&mut self, row: &SiteRosterFact) {
        if let Some(site) = trimmed_non_empty(row.site.as_deref()) {
            self.roster.insert(
                site,
                RosterEntry {
                    manager: trimmed_non_empty(row.manager.as_deref()),
                    supervisor: trimmed_non_empty(row.supervisor.as_deref()),
                },
            );
        }
    }

    pub fn assign(&self, driver_name: &str) -> SiteAssignment {
        let site_name = self.sites.mode(&driver_name.trim().to_string());
        let entry = site_name
            .as_ref()
            .and_then(|site| self.roster.get(site))
            .cloned()
            .unwrap_or_default();

        SiteAssignment {
            site_name,
            manager: entry.manager,
            supervisor: entry.supervisor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(driver: &str, corp: &str) -> RawTripFact {
        RawTripFact {
            driver_name: Some(driver.to_string()),
            corp_name: Some(corp.to_string()),
            ..Default::default()
        }
    }

    fn roster(site: &str, manager: &str, supervisor: &str) -> SiteRosterFact {
        SiteRosterFact {
            site: Some(site.to_string()),
            manager: Some(manager.to_string()),
            supervisor: Some(supervisor.to_string()),
        }
    }

    #[test]
    fn test_most_frequent_site_with_roster() {
        let mut attribution = SiteAttribution::new();
        attribution.observe_trip(&trip("E1 - Alice", "North"));
        attribution.observe_trip(&trip("E1 - Alice", "South"));
        attribution.observe_trip(&trip("E1 - Alice", "South"));
        attribution.observe_roster(&roster("South", "Maya", "Sam"));

        let assigned = attribution.assign("E1 - Alice");
        assert_eq!(assigned.site_name.as_deref(), Some("South"));
        assert_eq!(assigned.manager.as_deref(), Some("Maya"));
        assert_eq!(assigned.supervisor.as_deref(), Some("Sam"));
    }

    #[test]
    fn test_missing_lookups_are_null() {
        let mut attribution = SiteAttribution::for_drivers(vec!["E1 - Alice".to_string()]);
        attribution.observe_trip(&trip("E1 - Alice", "East"));
        attribution.observe_trip(&trip("E2 - Bob", "West"));

        let alice = attribution.assign("E1 - Alice");
        assert_eq!(alice.site_name.as_deref(), Some("East"));
        assert_eq!(alice.manager, None);

        assert_eq!(attribution.assign("E2 - Bob"), SiteAssignment::default());
    }
}
