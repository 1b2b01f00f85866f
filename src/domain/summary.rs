// ==========================================
// 车队司机评分系统 - 派生结果领域模型
// ==========================================
// 职责: 各评分分量汇总行、司机评分卡、主管班组均分
// 红线: 每次重算整表替换，禁止增量合并/打补丁
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// FpdSummary - 首站准点汇总（每司机一行）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FpdSummary {
    pub driver_name: String,
    pub login_trips: i64,          // 有计划时间的登录出车数
    pub fps_count: i64,            // 跳站 (Skip)
    pub order_mismatch_count: i64, // 迟到(顺序不符)
    pub fpd_count: i64,            // 迟到 (Late)
    pub percentage_of_fpds: f64,   // (跳站+顺序不符+迟到)/登录数，小数形式
}

impl FpdSummary {
    /// 偏差次数合计（跳站 + 顺序不符 + 迟到）
    pub fn deviations(&self) -> i64 {
        self.fps_count + self.order_mismatch_count + self.fpd_count
    }
}

// ==========================================
// SpareUsageSummary - 备用车使用汇总（每员工一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpareUsageSummary {
    pub employee_id: String,
    pub driver_name: String, // 该工号出现最多的司机名，缺失为 "not found"
    pub spare_usage_count: i64,
}

// ==========================================
// SpeedViolationSummary - 超速汇总（每司机一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedViolationSummary {
    pub driver_name: String,
    pub speed_violations: f64,
}

// ==========================================
// MileageSummary - 油耗汇总（每车辆一行）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MileageSummary {
    pub vehicle_number: String,
    pub driver_name: Option<String>, // 该车出车次数最多的司机
    pub ideal_mileage: Option<f64>,
    pub total_kms: Option<f64>,
    pub total_diesel: Option<f64>,
    pub average_mileage: String, // 实际油耗文本，缺失为 "No Diesel logs"
    pub variation: String,       // 偏差分类文本
}

// ==========================================
// DriverScorecard - 司机评分卡（最终实体）
// ==========================================
// 主键: (month_run_id, driver_name)
// 分量为 None 表示该分量缺少输入；合计时按 0 计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverScorecard {
    pub driver_name: String,
    pub site_name: Option<String>,
    pub manager: Option<String>,
    pub supervisor: Option<String>,
    pub fpd_score: Option<i64>,
    pub spare_usage_score: Option<i64>,
    pub speed_violation_score: Option<i64>,
    pub incident_score: Option<i64>,
    pub cleaning_score: Option<i64>,
    pub mileage_score: Option<i64>,
    pub driver_score_total: i64,
}

impl DriverScorecard {
    /// 六个分量之和（缺失分量按 0 计）
    pub fn component_total(&self) -> i64 {
        [
            self.fpd_score,
            self.spare_usage_score,
            self.speed_violation_score,
            self.incident_score,
            self.cleaning_score,
            self.mileage_score,
        ]
        .iter()
        .map(|score| score.unwrap_or(0))
        .sum()
    }
}

// ==========================================
// SupervisorTeamScore - 主管班组均分
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorTeamScore {
    pub supervisor_name: String,
    pub driver_count: i64,
    pub average_driver_score: f64, // 保留两位小数
}
