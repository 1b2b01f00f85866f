// ==========================================
// 车队司机评分系统 - 原始文本规范化
// ==========================================
// 职责: 空值判定、去空白、数值解析
// 红线: 只做格式清洗，不做业务判定
// ==========================================

/// 视为空值的原始取值（去空白后精确匹配）
pub const NULL_LIKES: [&str; 7] = ["", "NA", "N/A", "N.A.", "-", "null", "NULL"];

/// 是否为空值类文本
pub fn is_null_like(raw: &str) -> bool {
    NULL_LIKES.contains(&raw.trim())
}

/// 去空白后返回；缺失或空值类文本返回 None
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if is_null_like(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 去空白后返回；仅缺失或空串返回 None（不过滤 NA 等取值）
pub fn trimmed_non_empty(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 解析数值文本
///
/// 去除千分位逗号与百分号后解析；空值类文本或非法数值返回 None
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let text = normalize_text(raw)?;
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '%').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
