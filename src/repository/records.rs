// ==========================================
// 车队司机评分系统 - 表行映射
// ==========================================
// 职责: 领域结构体 <-> 表列 的映射（列顺序即 SELECT/INSERT 顺序）
// 红线: 只做映射，不做任何业务换算
// ==========================================

use crate::domain::{
    DriverScorecard, FpdSummary, MileageSummary, RawCleaningFact, RawDieselFact,
    RawIncidentFact, RawSpareFact, RawTripFact, SiteRosterFact, SpareUsageSummary,
    SpeedViolationSummary, SupervisorTeamScore,
};
use crate::repository::table_store::TableRecord;
use rusqlite::types::Value;
use rusqlite::Row;

fn text(value: &Option<String>) -> Value {
    match value {
        Some(v) => Value::Text(v.clone()),
        None => Value::Null,
    }
}

fn real(value: Option<f64>) -> Value {
    match value {
        Some(v) => Value::Real(v),
        None => Value::Null,
    }
}

fn integer(value: Option<i64>) -> Value {
    match value {
        Some(v) => Value::Integer(v),
        None => Value::Null,
    }
}

// ==========================================
// 原始事实表
// ==========================================

impl TableRecord for RawTripFact {
    const TABLE: &'static str = "operation_summary_report";
    const COLUMNS: &'static [&'static str] = &[
        "driver_name",
        "trip_type",
        "scheduled_start_end_time",
        "first_point_visit",
        "speed_violation",
        "vehicle_no",
        "corp_name",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            driver_name: row.get(0)?,
            trip_type: row.get(1)?,
            scheduled_start_end_time: row.get(2)?,
            first_point_visit: row.get(3)?,
            speed_violation: row.get(4)?,
            vehicle_no: row.get(5)?,
            corp_name: row.get(6)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.driver_name),
            text(&self.trip_type),
            text(&self.scheduled_start_end_time),
            text(&self.first_point_visit),
            text(&self.speed_violation),
            text(&self.vehicle_no),
            text(&self.corp_name),
        ]
    }
}

impl TableRecord for RawSpareFact {
    const TABLE: &'static str = "spare_utilization_report";
    const COLUMNS: &'static [&'static str] = &["scheduled_employee_id", "request_date"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            scheduled_employee_id: row.get(0)?,
            request_date: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.scheduled_employee_id), text(&self.request_date)]
    }
}

impl TableRecord for RawDieselFact {
    const TABLE: &'static str = "diesel_report";
    const COLUMNS: &'static [&'static str] = &[
        "vehicle_number",
        "ideal_mileage",
        "total_km",
        "diesel_in_litres",
        "mileage",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            vehicle_number: row.get(0)?,
            ideal_mileage: row.get(1)?,
            total_km: row.get(2)?,
            diesel_in_litres: row.get(3)?,
            mileage: row.get(4)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.vehicle_number),
            real(self.ideal_mileage),
            real(self.total_km),
            real(self.diesel_in_litres),
            real(self.mileage),
        ]
    }
}

impl TableRecord for RawIncidentFact {
    const TABLE: &'static str = "incident_report";
    const COLUMNS: &'static [&'static str] = &["emp_id", "driver_incident_score"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            emp_id: row.get(0)?,
            driver_incident_score: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.emp_id), real(self.driver_incident_score)]
    }
}

impl TableRecord for RawCleaningFact {
    const TABLE: &'static str = "cleaning_report";
    const COLUMNS: &'static [&'static str] = &["emp_id", "vehicle_exterior_score"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            emp_id: row.get(0)?,
            vehicle_exterior_score: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.emp_id), real(self.vehicle_exterior_score)]
    }
}

impl TableRecord for SiteRosterFact {
    const TABLE: &'static str = "site_am_sup_load_map";
    const COLUMNS: &'static [&'static str] = &["site", "manager", "supervisor"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            site: row.get(0)?,
            manager: row.get(1)?,
            supervisor: row.get(2)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.site), text(&self.manager), text(&self.supervisor)]
    }
}

// ==========================================
// 派生表
// ==========================================

impl TableRecord for FpdSummary {
    const TABLE: &'static str = "fpd_driver_summary";
    const COLUMNS: &'static [&'static str] = &[
        "driver_name",
        "login_trips",
        "fps_count",
        "order_mismatch_count",
        "fpd_count",
        "percentage_of_fpds",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            driver_name: row.get(0)?,
            login_trips: row.get(1)?,
            fps_count: row.get(2)?,
            order_mismatch_count: row.get(3)?,
            fpd_count: row.get(4)?,
            percentage_of_fpds: row.get(5)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.driver_name.clone()),
            Value::Integer(self.login_trips),
            Value::Integer(self.fps_count),
            Value::Integer(self.order_mismatch_count),
            Value::Integer(self.fpd_count),
            Value::Real(self.percentage_of_fpds),
        ]
    }
}

impl TableRecord for SpareUsageSummary {
    const TABLE: &'static str = "spare_usage_summary";
    const COLUMNS: &'static [&'static str] = &["employee_id", "driver_name", "spare_usage_count"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            employee_id: row.get(0)?,
            driver_name: row.get(1)?,
            spare_usage_count: row.get(2)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.employee_id.clone()),
            Value::Text(self.driver_name.clone()),
            Value::Integer(self.spare_usage_count),
        ]
    }
}

impl TableRecord for SpeedViolationSummary {
    const TABLE: &'static str = "speed_violation_summary";
    const COLUMNS: &'static [&'static str] = &["driver_name", "speed_violations"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            driver_name: row.get(0)?,
            speed_violations: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.driver_name.clone()),
            Value::Real(self.speed_violations),
        ]
    }
}

impl TableRecord for MileageSummary {
    const TABLE: &'static str = "mileage_summary";
    const COLUMNS: &'static [&'static str] = &[
        "vehicle_number",
        "driver_name",
        "ideal_mileage",
        "total_kms",
        "total_diesel",
        "average_mileage",
        "variation",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            vehicle_number: row.get(0)?,
            driver_name: row.get(1)?,
            ideal_mileage: row.get(2)?,
            total_kms: row.get(3)?,
            total_diesel: row.get(4)?,
            average_mileage: row.get(5)?,
            variation: row.get(6)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.vehicle_number.clone()),
            text(&self.driver_name),
            real(self.ideal_mileage),
            real(self.total_kms),
            real(self.total_diesel),
            Value::Text(self.average_mileage.clone()),
            Value::Text(self.variation.clone()),
        ]
    }
}

impl TableRecord for DriverScorecard {
    const TABLE: &'static str = "driver_scorecard";
    const COLUMNS: &'static [&'static str] = &[
        "driver_name",
        "site_name",
        "manager",
        "supervisor",
        "fpd_score",
        "spare_usage_score",
        "speed_violation_score",
        "incident_score",
        "cleaning_score",
        "mileage_score",
        "driver_score_total",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            driver_name: row.get(0)?,
            site_name: row.get(1)?,
            manager: row.get(2)?,
            supervisor: row.get(3)?,
            fpd_score: row.get(4)?,
            spare_usage_score: row.get(5)?,
            speed_violation_score: row.get(6)?,
            incident_score: row.get(7)?,
            cleaning_score: row.get(8)?,
            mileage_score: row.get(9)?,
            driver_score_total: row.get(10)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.driver_name.clone()),
            text(&self.site_name),
            text(&self.manager),
            text(&self.supervisor),
            integer(self.fpd_score),
            integer(self.spare_usage_score),
            integer(self.speed_violation_score),
            integer(self.incident_score),
            integer(self.cleaning_score),
            integer(self.mileage_score),
            Value::Integer(self.driver_score_total),
        ]
    }
}

impl TableRecord for SupervisorTeamScore {
    const TABLE: &'static str = "supervisor_team_score";
    const COLUMNS: &'static [&'static str] =
        &["supervisor_name", "driver_count", "average_driver_score"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            supervisor_name: row.get(0)?,
            driver_count: row.get(1)?,
            average_driver_score: row.get(2)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.supervisor_name.clone()),
            Value::Integer(self.driver_count),
            Value::Real(self.average_driver_score),
        ]
    }
}
