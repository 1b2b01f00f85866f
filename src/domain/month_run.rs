// ==========================================
// 车队司机评分系统 - 月度批次领域模型
// ==========================================

use crate::domain::types::{MonthRunId, MonthRunStatus};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 允许的年份范围
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

// ==========================================
// MonthRun - 月度批次
// ==========================================
// 以自然月首日 (YYYY-MM-01) 唯一标识
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRun {
    pub id: MonthRunId,
    pub month: NaiveDate, // 月首日
    pub status: MonthRunStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 将 (年, 月) 规范化为月首日
///
/// # 返回
/// - Some(NaiveDate): 年在 [2000, 2100]、月在 [1, 12] 内
/// - None: 超出范围
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// 将任意日期规范化为所在月首日
pub fn normalize_to_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
