// ==========================================
// 车队司机评分系统 - 众数统计器
// ==========================================
// 职责: 按 (键, 属性值) 计数，求每个键出现最多的属性值
// 使用方: 备用车显示名、车辆主驾驶员、司机所属站点
// 平局规则: 计数相同取字典序最小的值（与遍历顺序无关）
// ==========================================

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct ModeCounter<K, V> {
    counts: HashMap<K, BTreeMap<V, u64>>,
}

impl<K, V> Default for ModeCounter<K, V> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<K, V> ModeCounter<K, V>
where
    K: Eq + Hash,
    V: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次 (键, 值) 共现
    pub fn observe(&mut self, key: K, value: V) {
        *self.counts.entry(key).or_default().entry(value).or_insert(0) += 1;
    }

    /// 求某个键的众数
    pub fn mode(&self, key: &K) -> Option<V> {
        self.counts.get(key).and_then(pick_mode)
    }
}

// BTreeMap 升序遍历，只在严格更大时替换，平局保留字典序最小者
fn pick_mode<V: Ord + Clone>(values: &BTreeMap<V, u64>) -> Option<V> {
    let mut best: Option<(&V, u64)> = None;
    for (value, count) in values {
        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((value, *count)),
        }
    }
    best.map(|(value, _)| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_frequent_wins() {
        let mut counter = ModeCounter::new();
        counter.observe("V1", "Bob".to_string());
        counter.observe("V1", "Alice".to_string());
        counter.observe("V1", "Bob".to_string());

        assert_eq!(counter.mode(&"V1"), Some("Bob".to_string()));
        assert_eq!(counter.mode(&"V2"), None);
    }

    #[test]
    fn test_tie_break_is_order_independent() {
        let mut forward = ModeCounter::new();
        forward.observe(1, "Zed");
        forward.observe(1, "Amy");

        let mut backward = ModeCounter::new();
        backward.observe(1, "Amy");
        backward.observe(1, "Zed");

        assert_eq!(forward.mode(&1), Some("Amy"));
        assert_eq!(backward.mode(&1), Some("Amy"));
    }
}
