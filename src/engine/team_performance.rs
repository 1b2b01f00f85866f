// ==========================================
// 车队司机评分系统 - 主管班组均分
// ==========================================
// 输入: driver_scorecard
// 输出: supervisor_team_score（每主管一行）
// 规则: 主管为空 → "Unknown"；均分保留两位小数
// ==========================================

use crate::domain::{DriverScorecard, MonthRunId, SupervisorTeamScore};
use crate::engine::error::EngineResult;
use crate::engine::normalize::{round_to, trimmed_non_empty};
use crate::repository::{PagedScan, TableStore};
use std::collections::BTreeMap;
use tracing::{info, instrument};

pub const UNKNOWN_SUPERVISOR: &str = "Unknown";

pub struct TeamPerformanceAggregator {
    page_size: usize,
}

impl TeamPerformanceAggregator {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    fn observe(teams: &mut BTreeMap<String, (i64, i64)>, card: &DriverScorecard) {
        let supervisor = trimmed_non_empty(card.supervisor.as_deref())
            .unwrap_or_else(|| UNKNOWN_SUPERVISOR.to_string());
        let (sum, count) = teams.entry(supervisor).or_insert((0, 0));
        *sum += card.driver_score_total;
        *count += 1;
    }

    fn into_rows(teams: BTreeMap<String, (i64, i64)>) -> Vec<SupervisorTeamScore> {
        teams
            .into_iter()
            .map(|(supervisor_name, (sum, count))| SupervisorTeamScore {
                supervisor_name,
                driver_count: count,
                average_driver_score: if count > 0 {
                    round_to(sum as f64 / count as f64, 2)
                } else {
                    0.0
                },
            })
            .collect()
    }

    pub fn aggregate<'a>(
        cards: impl IntoIterator<Item = &'a DriverScorecard>,
    ) -> Vec<SupervisorTeamScore> {
        let mut teams = BTreeMap::new();
        cards.into_iter().for_each(|card| Self::observe(&mut teams, card));
        Self::into_rows(teams)
    }

    #[instrument(skip(self, store), fields(month_run_id = %month_run_id))]
    pub fn run<S: TableStore>(&self, store: &S, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let mut teams = BTreeMap::new();
        let scanned = PagedScan::<S, DriverScorecard>::new(store, month_run_id, self.page_size)
            .for_each_row(|card| Self::observe(&mut teams, &card))?;

        let inserted = store.replace_month(month_run_id, &Self::into_rows(teams))?;

        info!(scanned, inserted, "班组均分完成");
        Ok(inserted)
    }
}
