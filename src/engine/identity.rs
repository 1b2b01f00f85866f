// ==========================================
// 车队司机评分系统 - 身份解析器
// ==========================================
// 职责: 从 "<工号> - <姓名>" 复合司机名中提取规范化工号
// 红线: 解析必须确定且完备，无连字符时整串即身份
// ==========================================

use crate::domain::DriverIdentity;

/// 解析司机身份
///
/// 规则:
/// - 去除首尾空白，空白串返回 None（调用方跳过该行）
/// - 取第一个连字符之前的子串并去空白
/// - 无连字符，或连字符位于开头（前缀为空），整串即身份
///
/// # 示例
/// ```
/// use fleet_scorecard::engine::identity::resolve_identity;
///
/// assert_eq!(resolve_identity("12345 - John Doe").unwrap().as_str(), "12345");
/// assert_eq!(resolve_identity("NoHyphenName").unwrap().as_str(), "NoHyphenName");
/// assert!(resolve_identity("   ").is_none());
/// ```
pub fn resolve_identity(driver_name: &str) -> Option<DriverIdentity> {
    let trimmed = driver_name.trim();
    if trimmed.is_empty() {
        return None;
    }

    let key = match trimmed.split_once('-') {
        Some((prefix, _)) if !prefix.trim().is_empty() => prefix.trim(),
        _ => trimmed,
    };

    Some(DriverIdentity::from_normalized(key.to_string()))
}

/// 规范化按工号存储的列（事故、清洁、备用车）
///
/// 已经是工号，只去空白；空白串返回 None
pub fn normalize_employee_id(raw: &str) -> Option<DriverIdentity> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(DriverIdentity::from_normalized(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_composite_name() {
        assert_eq!(resolve_identity("12345 - John Doe").unwrap().as_str(), "12345");
        assert_eq!(resolve_identity("  E1-Alice ").unwrap().as_str(), "E1");
        // 只按第一个连字符切分
        assert_eq!(resolve_identity("E2 - Mary-Jane").unwrap().as_str(), "E2");
    }

    #[test]
    fn test_resolve_fallback_whole_string() {
        assert_eq!(resolve_identity("NoHyphenName").unwrap().as_str(), "NoHyphenName");
        assert_eq!(resolve_identity(" - Ghost").unwrap().as_str(), "- Ghost");
    }

    #[test]
    fn test_resolve_blank() {
        assert!(resolve_identity("").is_none());
        assert!(resolve_identity("   ").is_none());
    }

    #[test]
    fn test_employee_id_matches_resolved_identity() {
        assert_eq!(
            normalize_employee_id(" 12345 "),
            resolve_identity("12345 - John Doe")
        );
        assert!(normalize_employee_id("  ").is_none());
    }
}
