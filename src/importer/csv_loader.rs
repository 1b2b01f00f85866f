// ==========================================
// 车队司机评分系统 - CSV 原始事实加载器
// ==========================================
// 输入: 目录下每张原始表一个 CSV（表头即规范列名）
//   operation_summary_report.csv  （必需）
//   spare_utilization_report.csv / diesel_report.csv / incident_report.csv
//   cleaning_report.csv / site_am_sup_load_map.csv（可选，缺失视为空表）
// 输出: RawFactBundle
// 约定: 完全空白的行跳过；数值列的空值类文本视为缺失，其余无法解析报错
// ==========================================

use crate::domain::{
    RawCleaningFact, RawDieselFact, RawFactBundle, RawIncidentFact, RawSpareFact, RawTripFact,
    SiteRosterFact,
};
use crate::engine::normalize::{normalize_text, parse_number};
use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{info, instrument};

pub const TRIPS_FILE: &str = "operation_summary_report.csv";
pub const SPARE_FILE: &str = "spare_utilization_report.csv";
pub const DIESEL_FILE: &str = "diesel_report.csv";
pub const INCIDENT_FILE: &str = "incident_report.csv";
pub const CLEANING_FILE: &str = "cleaning_report.csv";
pub const SITE_ROSTER_FILE: &str = "site_am_sup_load_map.csv";

// 数值列先按文本读入，再统一解析
#[derive(Debug, Deserialize)]
struct DieselRow {
    vehicle_number: Option<String>,
    ideal_mileage: Option<String>,
    total_km: Option<String>,
    diesel_in_litres: Option<String>,
    mileage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncidentRow {
    emp_id: Option<String>,
    driver_incident_score: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CleaningRow {
    emp_id: Option<String>,
    vehicle_exterior_score: Option<String>,
}

/// 从目录加载一个月度批次的原始事实
///
/// # 参数
/// - dir: CSV 所在目录
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_bundle_from_dir(dir: &Path) -> ImportResult<RawFactBundle> {
    if !dir.is_dir() {
        return Err(ImportError::DirectoryNotFound(dir.display().to_string()));
    }

    let trips_path = dir.join(TRIPS_FILE);
    if !trips_path.exists() {
        return Err(ImportError::FileNotFound(trips_path.display().to_string()));
    }

    let diesel_logs = read_optional::<DieselRow>(dir, DIESEL_FILE)?
        .into_iter()
        .map(|(row_no, row)| {
            Ok(RawDieselFact {
                ideal_mileage: number(DIESEL_FILE, row_no, "ideal_mileage", &row.ideal_mileage)?,
                total_km: number(DIESEL_FILE, row_no, "total_km", &row.total_km)?,
                diesel_in_litres: number(
                    DIESEL_FILE,
                    row_no,
                    "diesel_in_litres",
                    &row.diesel_in_litres,
                )?,
                mileage: number(DIESEL_FILE, row_no, "mileage", &row.mileage)?,
                vehicle_number: row.vehicle_number,
            })
        })
        .collect::<ImportResult<Vec<_>>>()?;

    let incidents = read_optional::<IncidentRow>(dir, INCIDENT_FILE)?
        .into_iter()
        .map(|(row_no, row)| {
            Ok(RawIncidentFact {
                driver_incident_score: number(
                    INCIDENT_FILE,
                    row_no,
                    "driver_incident_score",
                    &row.driver_incident_score,
                )?,
                emp_id: row.emp_id,
            })
        })
        .collect::<ImportResult<Vec<_>>>()?;

    let cleaning_audits = read_optional::<CleaningRow>(dir, CLEANING_FILE)?
        .into_iter()
        .map(|(row_no, row)| {
            Ok(RawCleaningFact {
                vehicle_exterior_score: number(
                    CLEANING_FILE,
                    row_no,
                    "vehicle_exterior_score",
                    &row.vehicle_exterior_score,
                )?,
                emp_id: row.emp_id,
            })
        })
        .collect::<ImportResult<Vec<_>>>()?;

    let bundle = RawFactBundle {
        trips: rows_only(read_csv::<RawTripFact>(&trips_path, TRIPS_FILE)?),
        spare_requests: rows_only(read_optional::<RawSpareFact>(dir, SPARE_FILE)?),
        diesel_logs,
        incidents,
        cleaning_audits,
        site_roster: rows_only(read_optional::<SiteRosterFact>(dir, SITE_ROSTER_FILE)?),
    };

    info!(
        trips = bundle.trips.len(),
        spare_requests = bundle.spare_requests.len(),
        diesel_logs = bundle.diesel_logs.len(),
        incidents = bundle.incidents.len(),
        cleaning_audits = bundle.cleaning_audits.len(),
        site_roster = bundle.site_roster.len(),
        "CSV 加载完成"
    );
    Ok(bundle)
}

fn rows_only<T>(rows: Vec<(usize, T)>) -> Vec<T> {
    rows.into_iter().map(|(_, row)| row).collect()
}

fn read_optional<T: DeserializeOwned>(dir: &Path, file_name: &str) -> ImportResult<Vec<(usize, T)>> {
    let path = dir.join(file_name);
    if path.exists() {
        read_csv(&path, file_name)
    } else {
        Ok(Vec::new())
    }
}

/// 读取 CSV，返回 (数据行号, 记录)，行号从 1 开始且不含表头
fn read_csv<T: DeserializeOwned>(path: &Path, file_name: &str) -> ImportResult<Vec<(usize, T)>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .trim(Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| parse_error(file_name, 0, e))?
        .clone();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row_no = index + 1;
        let record = result.map_err(|e| parse_error(file_name, row_no, e))?;

        // 跳过完全空白的行
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| parse_error(file_name, row_no, e))?;
        rows.push((row_no, row));
    }

    Ok(rows)
}

fn parse_error(file: &str, row: usize, err: csv::Error) -> ImportError {
    ImportError::CsvParseError {
        file: file.to_string(),
        row,
        message: err.to_string(),
    }
}

fn number(file: &str, row: usize, field: &str, raw: &Option<String>) -> ImportResult<Option<f64>> {
    if normalize_text(raw.as_deref()).is_none() {
        return Ok(None);
    }
    parse_number(raw.as_deref())
        .map(Some)
        .ok_or_else(|| ImportError::TypeConversionError {
            file: file.to_string(),
            row,
            field: field.to_string(),
            value: raw.clone().unwrap_or_default(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_trips_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_bundle_from_dir(dir.path()),
            Err(ImportError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_number_column_null_likes_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TRIPS_FILE), "driver_name,trip_type\nE1 - Alice,Login\n").unwrap();
        fs::write(
            dir.path().join(INCIDENT_FILE),
            "emp_id,driver_incident_score\nE1,3\nE2,NA\n",
        )
        .unwrap();

        let bundle = load_bundle_from_dir(dir.path()).unwrap();
        assert_eq!(bundle.incidents.len(), 2);
        assert_eq!(bundle.incidents[0].driver_incident_score, Some(3.0));
        assert_eq!(bundle.incidents[1].driver_incident_score, None);

        fs::write(
            dir.path().join(INCIDENT_FILE),
            "emp_id,driver_incident_score\nE1,three\n",
        )
        .unwrap();
        assert!(matches!(
            load_bundle_from_dir(dir.path()),
            Err(ImportError::TypeConversionError { row: 1, .. })
        ));
    }
}
