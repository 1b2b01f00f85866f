// ==========================================
// 车队司机评分系统 - 流水线编排器
// ==========================================
// 职责:
//   1. 全量运行: 清空批次全部表 → 分块写入原始事实 → 依序执行各阶段
//   2. 重算: 仅依序执行各阶段（不重新导入原始事实）
//   3. 汇总每个阶段的写入行数/错误，形成一份运行报告
// 顺序: FPD → 备用车 → 超速 → 油耗 → 评分卡 → 班组均分
// 约定:
//   - 遇到第一个失败阶段即停止，后续阶段标记为跳过
//   - 已完成阶段不回滚（部分成功对调用方可见）
//   - 同一批次并发运行不做保护
// ==========================================

use crate::config::PipelineSettings;
use crate::db::{DERIVED_TABLES, RAW_FACT_TABLES};
use crate::domain::{MonthRunId, PipelineStage, RawFactBundle, RawImportCounts};
use crate::engine::error::EngineResult;
use crate::engine::{
    FpdAggregator, MileageAggregator, ScorecardCombiner, SpareUsageAggregator,
    SpeedViolationAggregator, TeamPerformanceAggregator,
};
use crate::repository::{TableRecord, TableStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

// ==========================================
// 运行报告
// ==========================================

/// 单阶段结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Inserted { rows_inserted: usize },
    Failed { error: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub month_run_id: MonthRunId,
    pub raw_counts: Option<RawImportCounts>, // 仅全量运行
    pub stages: Vec<StageReport>,
    pub error: Option<String>, // 第一个失败的错误信息
    pub elapsed_ms: i64,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// 某阶段的写入行数（未成功返回 None）
    pub fn rows_inserted(&self, stage: PipelineStage) -> Option<usize> {
        self.stages.iter().find(|r| r.stage == stage).and_then(|r| match r.outcome {
            StageOutcome::Inserted { rows_inserted } => Some(rows_inserted),
            _ => None,
        })
    }
}

// ==========================================
// RunController - 流水线编排器
// ==========================================
pub struct RunController<S: TableStore> {
    store: Arc<S>,
    settings: PipelineSettings,
}

impl<S: TableStore> RunController<S> {
    /// # 参数
    /// - store: 通用表存储
    /// - settings: 流水线参数（分页、分块、准入阈值）
    pub fn new(store: Arc<S>, settings: PipelineSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// 执行单个阶段，返回写入行数
    pub fn run_stage(&self, stage: PipelineStage, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let store = self.store.as_ref();
        let page_size = self.settings.page_size;

        match stage {
            PipelineStage::Fpd => FpdAggregator::new(page_size).run(store, month_run_id),
            PipelineStage::SpareUsage => SpareUsageAggregator::new(page_size).run(store, month_run_id),
            PipelineStage::SpeedViolations => {
                SpeedViolationAggregator::new(page_size).run(store, month_run_id)
            }
            PipelineStage::Mileage => MileageAggregator::new(page_size).run(store, month_run_id),
            PipelineStage::DriverScorecard => {
                ScorecardCombiner::new(page_size, self.settings.min_login_trips)
                    .run(store, month_run_id)
            }
            PipelineStage::TeamPerformance => {
                TeamPerformanceAggregator::new(page_size).run(store, month_run_id)
            }
        }
    }

    /// 重算: 依序执行全部阶段
    #[instrument(skip(self), fields(month_run_id = %month_run_id))]
    pub fn recalculate(&self, month_run_id: &MonthRunId) -> RunReport {
        let started = Instant::now();
        let (stages, error) = self.run_all_stages(month_run_id);

        RunReport {
            month_run_id: month_run_id.clone(),
            raw_counts: None,
            stages,
            error,
            elapsed_ms: started.elapsed().as_millis() as i64,
        }
    }

    /// 全量运行: 清空 → 导入原始事实 → 依序执行全部阶段
    ///
    /// 清空或导入失败时不执行任何阶段（全部标记为跳过）
    #[instrument(skip(self, bundle), fields(month_run_id = %month_run_id))]
    pub fn run_full(&self, month_run_id: &MonthRunId, bundle: &RawFactBundle) -> RunReport {
        let started = Instant::now();

        let imported = self
            .clear_month(month_run_id)
            .and_then(|_| self.import_raw(month_run_id, bundle));

        let (raw_counts, stages, error) = match imported {
            Ok(counts) => {
                let (stages, error) = self.run_all_stages(month_run_id);
                (Some(counts), stages, error)
            }
            Err(e) => {
                error!(error = %e, "原始事实导入失败");
                (None, skipped_from(0), Some(e.to_string()))
            }
        };

        RunReport {
            month_run_id: month_run_id.clone(),
            raw_counts,
            stages,
            error,
            elapsed_ms: started.elapsed().as_millis() as i64,
        }
    }

    /// 删除批次在全部原始表与派生表中的行（派生表先删）
    pub fn clear_month(&self, month_run_id: &MonthRunId) -> EngineResult<usize> {
        let mut deleted = 0;
        for table in DERIVED_TABLES.iter().rev().chain(RAW_FACT_TABLES.iter()) {
            deleted += self.store.delete_where(table, month_run_id, &[])?;
        }
        info!(deleted, "批次数据已清空");
        Ok(deleted)
    }

    /// 分块写入原始事实
    pub fn import_raw(
        &self,
        month_run_id: &MonthRunId,
        bundle: &RawFactBundle,
    ) -> EngineResult<RawImportCounts> {
        let counts = RawImportCounts {
            trips: self.insert_chunked(month_run_id, &bundle.trips)?,
            spare_requests: self.insert_chunked(month_run_id, &bundle.spare_requests)?,
            diesel_logs: self.insert_chunked(month_run_id, &bundle.diesel_logs)?,
            incidents: self.insert_chunked(month_run_id, &bundle.incidents)?,
            cleaning_audits: self.insert_chunked(month_run_id, &bundle.cleaning_audits)?,
            site_roster: self.insert_chunked(month_run_id, &bundle.site_roster)?,
        };
        info!(?counts, "原始事实导入完成");
        Ok(counts)
    }

    fn insert_chunked<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> EngineResult<usize> {
        let mut inserted = 0;
        for chunk in rows.chunks(self.settings.insert_chunk_size.max(1)) {
            inserted += self.store.insert_batch(month_run_id, chunk)?;
        }
        Ok(inserted)
    }

    fn run_all_stages(&self, month_run_id: &MonthRunId) -> (Vec<StageReport>, Option<String>) {
        let mut reports = Vec::with_capacity(PipelineStage::ORDERED.len());

        for (index, stage) in PipelineStage::ORDERED.into_iter().enumerate() {
            match self.run_stage(stage, month_run_id) {
                Ok(rows_inserted) => {
                    info!(%stage, rows_inserted, "阶段完成");
                    reports.push(StageReport {
                        stage,
                        outcome: StageOutcome::Inserted { rows_inserted },
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(%stage, error = %message, "阶段失败，停止后续阶段");
                    reports.push(StageReport {
                        stage,
                        outcome: StageOutcome::Failed {
                            error: message.clone(),
                        },
                    });
                    reports.extend(skipped_from(index + 1));
                    return (reports, Some(message));
                }
            }
        }

        (reports, None)
    }
}

fn skipped_from(start: usize) -> Vec<StageReport> {
    PipelineStage::ORDERED[start..]
        .iter()
        .map(|stage| StageReport {
            stage: *stage,
            outcome: StageOutcome::Skipped,
        })
        .collect()
}
