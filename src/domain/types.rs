// ==========================================
// 车队司机评分系统 - 领域类型定义
// ==========================================
// 职责: 月度批次标识、司机身份键、首站到达分类、流水线阶段
// 红线: 身份键只能由身份解析器产生，禁止各聚合器自行拼接字符串
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 出车类型: 登录（仅 Login 行参与 FPD 统计）
pub const TRIP_TYPE_LOGIN: &str = "Login";

// ==========================================
// 月度批次标识 (Month Run Id)
// ==========================================
// 不透明令牌，标识一个自然月的导入批次；所有事实表与结果表的分区键
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthRunId(String);

impl MonthRunId {
    /// 解析外部传入的批次ID（去除首尾空白，空串视为缺失）
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// 司机身份键 (Driver Identity)
// ==========================================
// 由 "<工号> - <姓名>" 复合字符串解析出的规范化员工标识
// 用于桥接按工号存储的表（事故、清洁、备用车）与按司机名存储的表
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverIdentity(String);

impl DriverIdentity {
    /// 仅供身份解析器与已规范化的工号列使用
    pub(crate) fn from_normalized(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// 首站到达情况 (First Point Visit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirstPointVisit {
    OnTime,            // 准时（含未知取值）
    Skip,              // 跳站 (FPS)
    Late,              // 迟到 (FPD)
    LateOrderMismatch, // 迟到(顺序不符)
}

impl FirstPointVisit {
    /// 从原始文本解析（精确匹配，去除首尾空白）
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Skip") => FirstPointVisit::Skip,
            Some("Late") => FirstPointVisit::Late,
            Some("Late(Order Mismatch)") => FirstPointVisit::LateOrderMismatch,
            _ => FirstPointVisit::OnTime,
        }
    }
}

// ==========================================
// 月度批次状态 (Month Run Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthRunStatus {
    RawLoaded, // 原始数据已导入
    Scored,    // 评分完成
    Failed,    // 评分阶段失败
}

impl MonthRunStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "raw_loaded" => Some(MonthRunStatus::RawLoaded),
            "scored" => Some(MonthRunStatus::Scored),
            "failed" => Some(MonthRunStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for MonthRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthRunStatus::RawLoaded => write!(f, "raw_loaded"),
            MonthRunStatus::Scored => write!(f, "scored"),
            MonthRunStatus::Failed => write!(f, "failed"),
        }
    }
}

// ==========================================
// 流水线阶段 (Pipeline Stage)
// ==========================================
// 顺序固定: FPD → 备用车 → 超速 → 油耗 → 评分卡 → 班组均分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Fpd,
    SpareUsage,
    SpeedViolations,
    Mileage,
    DriverScorecard,
    TeamPerformance,
}

impl PipelineStage {
    /// 编排顺序
    pub const ORDERED: [PipelineStage; 6] = [
        PipelineStage::Fpd,
        PipelineStage::SpareUsage,
        PipelineStage::SpeedViolations,
        PipelineStage::Mileage,
        PipelineStage::DriverScorecard,
        PipelineStage::TeamPerformance,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ORDERED.into_iter().find(|stage| stage.to_string() == raw.trim())
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Fpd => write!(f, "fpd"),
            PipelineStage::SpareUsage => write!(f, "spare_usage"),
            PipelineStage::SpeedViolations => write!(f, "speed_violations"),
            PipelineStage::Mileage => write!(f, "mileage"),
            PipelineStage::DriverScorecard => write!(f, "driver_scorecard"),
            PipelineStage::TeamPerformance => write!(f, "team_performance"),
        }
    }
}
