// ==========================================
// 车队司机评分系统 - 分项评分规则
// ==========================================
// 职责: 分项原始值 → 0/5/10/20 分
// 红线: 输入缺失返回 None（分项为空），不得折算为 0 分
// ==========================================

use crate::engine::mileage::VARIATION_POSITIVE;

/// FPD 评分
///
/// 以整数比较偏差次数与登录数：deviations / logins <= 9% 得 20，<= 15% 得 10。
/// 登录数为 0 时无比例，返回 None
pub fn score_fpd(deviations: i64, logins: i64) -> Option<i64> {
    if logins <= 0 {
        return None;
    }
    let scaled = deviations * 100;
    Some(if scaled <= 9 * logins {
        20
    } else if scaled <= 15 * logins {
        10
    } else {
        0
    })
}

/// 备用车使用次数评分
pub fn score_spare_usage(count: Option<i64>) -> Option<i64> {
    let count = count?;
    Some(if count <= 2 {
        20
    } else if count <= 4 {
        10
    } else {
        0
    })
}

/// 超速次数评分
pub fn score_speed_violations(count: Option<f64>) -> Option<i64> {
    let count = count?;
    Some(if count <= 4.0 {
        20
    } else if count <= 9.0 {
        10
    } else {
        0
    })
}

/// 事故评分（原始分 3 → 20，2 → 10）
pub fn score_incident(raw: Option<f64>) -> Option<i64> {
    let raw = raw?;
    Some(if raw == 3.0 {
        20
    } else if raw == 2.0 {
        10
    } else {
        0
    })
}

/// 清洁评分（原始分 3 → 10，2 → 5）
pub fn score_cleaning(raw: Option<f64>) -> Option<i64> {
    let raw = raw?;
    Some(if raw == 3.0 {
        10
    } else if raw == 2.0 {
        5
    } else {
        0
    })
}

/// 油耗偏差评分
///
/// "Positive" 或 "<x>%" 且 x <= 5 得 10 分，其余 0 分；空偏差为 None
pub fn score_mileage(variation: Option<&str>) -> Option<i64> {
    let variation = variation.map(str::trim).filter(|v| !v.is_empty())?;
    if variation == VARIATION_POSITIVE {
        return Some(10);
    }

    let within_tolerance = variation
        .strip_suffix('%')
        .and_then(|pct| pct.trim().parse::<f64>().ok())
        .map(|pct| pct <= 5.0)
        .unwrap_or(false);

    Some(if within_tolerance { 10 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fpd_boundaries() {
        // 恰好 9% / 15% 落在阈值内
        assert_eq!(score_fpd(9, 100), Some(20));
        assert_eq!(score_fpd(901, 10_000), Some(10));
        assert_eq!(score_fpd(15, 100), Some(10));
        assert_eq!(score_fpd(1501, 10_000), Some(0));
        // 7/77 = 9.09%
        assert_eq!(score_fpd(7, 77), Some(10));
        assert_eq!(score_fpd(1, 10), Some(10));
        assert_eq!(score_fpd(1, 2), Some(0));
        assert_eq!(score_fpd(0, 5), Some(20));
        assert_eq!(score_fpd(0, 0), None);
    }

    #[test]
    fn test_spare_and_speed() {
        assert_eq!(score_spare_usage(Some(0)), Some(20));
        assert_eq!(score_spare_usage(Some(2)), Some(20));
        assert_eq!(score_spare_usage(Some(4)), Some(10));
        assert_eq!(score_spare_usage(Some(5)), Some(0));
        assert_eq!(score_spare_usage(None), None);

        assert_eq!(score_speed_violations(Some(4.0)), Some(20));
        assert_eq!(score_speed_violations(Some(9.0)), Some(10));
        assert_eq!(score_speed_violations(Some(10.0)), Some(0));
    }

    #[test]
    fn test_incident_and_cleaning() {
        assert_eq!(score_incident(Some(3.0)), Some(20));
        assert_eq!(score_incident(Some(2.0)), Some(10));
        assert_eq!(score_incident(Some(1.0)), Some(0));
        assert_eq!(score_cleaning(Some(3.0)), Some(10));
        assert_eq!(score_cleaning(Some(2.0)), Some(5));
        assert_eq!(score_cleaning(Some(0.0)), Some(0));
        assert_eq!(score_cleaning(None), None);
    }

    #[test]
    fn test_mileage() {
        assert_eq!(score_mileage(Some("Positive")), Some(10));
        assert_eq!(score_mileage(Some("0%")), Some(10));
        assert_eq!(score_mileage(Some("5.00%")), Some(10));
        assert_eq!(score_mileage(Some("5.01%")), Some(0));
        assert_eq!(score_mileage(Some("Over Positive")), Some(0));
        assert_eq!(score_mileage(Some("No diesel logs")), Some(0));
        assert_eq!(score_mileage(Some("")), None);
        assert_eq!(score_mileage(None), None);
    }
}
