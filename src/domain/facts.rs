// ==========================================
// 车队司机评分系统 - 原始事实领域模型
// ==========================================
// 职责: 定义导入后的原始事实行（不含 month_run_id，由仓储层按分区写入）
// 红线: 导入后不可变，只能随月度批次整体删除重建
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// RawTripFact - 出车记录（operation_summary_report）
// ==========================================
// 消费方: FPD / 超速 / 油耗 / 站点归属
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTripFact {
    pub driver_name: Option<String>,              // "<工号> - <姓名>" 复合字符串
    pub trip_type: Option<String>,                // 出车类型 (Login / Logout ...)
    pub scheduled_start_end_time: Option<String>, // 计划起止时间（可能为空或 NA）
    pub first_point_visit: Option<String>,        // 首站到达情况
    pub speed_violation: Option<String>,          // 超速次数（原始文本）
    pub vehicle_no: Option<String>,               // 车牌号
    pub corp_name: Option<String>,                // 站点名称
}

// ==========================================
// RawSpareFact - 备用车申请（spare_utilization_report）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSpareFact {
    pub scheduled_employee_id: Option<String>, // 申请人工号
    pub request_date: Option<String>,          // 申请日期
}

// ==========================================
// RawDieselFact - 加油/油耗记录（diesel_report）
// ==========================================
// 每车每月预期至多一行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDieselFact {
    pub vehicle_number: Option<String>,
    pub ideal_mileage: Option<f64>,    // 理想油耗 (km/L)
    pub total_km: Option<f64>,         // 总里程
    pub diesel_in_litres: Option<f64>, // 总加油量
    pub mileage: Option<f64>,          // 实际油耗 (km/L)
}

// ==========================================
// RawIncidentFact - 事故评分（incident_report）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIncidentFact {
    pub emp_id: Option<String>,
    pub driver_incident_score: Option<f64>, // 序数评分 (0-3)
}

// ==========================================
// RawCleaningFact - 车辆清洁审核（cleaning_report）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCleaningFact {
    pub emp_id: Option<String>,
    pub vehicle_exterior_score: Option<f64>, // 序数评分 (0-3)
}

// ==========================================
// SiteRosterFact - 站点经理/主管映射（site_am_sup_load_map）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteRosterFact {
    pub site: Option<String>,
    pub manager: Option<String>,
    pub supervisor: Option<String>,
}

// ==========================================
// RawFactBundle - 一个月度批次的全部原始事实
// ==========================================
/// 导入方交给流水线的数据包（已完成表头映射与校验）
#[derive(Debug, Clone, Default)]
pub struct RawFactBundle {
    pub trips: Vec<RawTripFact>,
    pub spare_requests: Vec<RawSpareFact>,
    pub diesel_logs: Vec<RawDieselFact>,
    pub incidents: Vec<RawIncidentFact>,
    pub cleaning_audits: Vec<RawCleaningFact>,
    pub site_roster: Vec<SiteRosterFact>,
}

/// 原始事实写入计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImportCounts {
    pub trips: usize,
    pub spare_requests: usize,
    pub diesel_logs: usize,
    pub incidents: usize,
    pub cleaning_audits: usize,
    pub site_roster: usize,
}
