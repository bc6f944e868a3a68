//! Rankings over an [`AggregationResult`]: top-N, dominant key and shares of total.

use serde::Serialize;
use std::cmp::Ordering;

use crate::aggregate::{AggregateEntry, AggregationResult};
use crate::error::{EngineError, EngineResult};

/// Largest sum first, ties by ascending key.
fn by_sum_desc_then_key<K: Ord>(a: &AggregateEntry<K>, b: &AggregateEntry<K>) -> Ordering {
    b.sum.total_cmp(&a.sum).then_with(|| a.key.cmp(&b.key))
}

/// The `n` entries with the largest sums, in descending order (ties: ascending key).
/// `n` larger than the input returns every entry.
pub fn top_n<K: Ord + Clone>(agg: &AggregationResult<K>, n: usize) -> AggregationResult<K> {
    let mut entries = agg.entries().to_vec();
    entries.sort_by(by_sum_desc_then_key);
    entries.truncate(n);
    AggregationResult::from_entries(entries)
}

/// Every entry, largest sum first.
pub fn rank_descending<K: Ord + Clone>(agg: &AggregationResult<K>) -> AggregationResult<K> {
    top_n(agg, agg.len())
}

/// Low-to-high order for horizontal bar layouts. Stable, so equal sums keep their
/// incoming order.
pub fn ascending_by_sum<K: Clone>(agg: &AggregationResult<K>) -> AggregationResult<K> {
    let mut entries = agg.entries().to_vec();
    entries.sort_by(|a, b| a.sum.total_cmp(&b.sum));
    AggregationResult::from_entries(entries)
}

/// The single largest-sum entry (ties: lowest key).
pub fn dominant<K: Ord>(agg: &AggregationResult<K>) -> EngineResult<&AggregateEntry<K>> {
    agg.iter()
        .min_by(|a, b| by_sum_desc_then_key(a, b))
        .ok_or(EngineError::EmptyAggregation)
}

/// A percentage of a total, or `NotApplicable` when the total is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Share {
    Percent(f64),
    NotApplicable,
}

impl Share {
    pub fn of(part: f64, total: f64) -> Self {
        if total == 0.0 || !total.is_finite() {
            Share::NotApplicable
        } else {
            Share::Percent(part / total * 100.0)
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Share::Percent(p) => Some(*p),
            Share::NotApplicable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareEntry<K> {
    pub key: K,
    pub sum: f64,
    pub share: Share,
}

/// Each entry's share of the aggregation total, in input order.
pub fn shares<K: Clone>(agg: &AggregationResult<K>) -> Vec<ShareEntry<K>> {
    let total = agg.total();
    agg.iter()
        .map(|e| ShareEntry {
            key: e.key.clone(),
            sum: e.sum,
            share: Share::of(e.sum, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(pairs: &[(&str, f64)]) -> AggregationResult<String> {
        AggregationResult::from_entries(
            pairs
                .iter()
                .map(|(k, s)| AggregateEntry {
                    key: k.to_string(),
                    sum: *s,
                })
                .collect(),
        )
    }

    fn keys(agg: &AggregationResult<String>) -> Vec<&str> {
        agg.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_top_n_breaks_ties_by_key() {
        let input = agg(&[("A", 5.0), ("B", 5.0), ("C", 9.0), ("D", 1.0)]);
        assert_eq!(keys(&top_n(&input, 1)), vec!["C"]);
        assert_eq!(keys(&top_n(&input, 3)), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_top_n_larger_than_input() {
        let input = agg(&[("A", 1.0), ("B", 2.0)]);
        assert_eq!(keys(&top_n(&input, 15)), vec!["B", "A"]);
        assert!(top_n(&AggregationResult::<String>::default(), 3).is_empty());
    }

    #[test]
    fn test_top_n_is_idempotent() {
        let input = agg(&[("A", 5.0), ("B", 5.0), ("C", 9.0), ("D", 1.0), ("E", 5.0)]);
        for n in 0..7 {
            let once = top_n(&input, n);
            assert_eq!(top_n(&once, n), once);
        }
    }

    #[test]
    fn test_ascending_for_bar_layout() {
        let input = agg(&[("A", 5.0), ("B", 5.0), ("C", 9.0), ("D", 1.0)]);
        let bars = ascending_by_sum(&top_n(&input, 3));
        assert_eq!(keys(&bars), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_rank_descending_keeps_all() {
        let input = agg(&[("A", 2.0), ("B", 7.0), ("C", 4.0)]);
        assert_eq!(keys(&rank_descending(&input)), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_dominant() {
        let input = agg(&[("B", 5.0), ("A", 5.0), ("C", 1.0)]);
        let top = dominant(&input).unwrap();
        assert_eq!(top.key, "A");
        assert_eq!(top.sum, 5.0);
    }

    #[test]
    fn test_dominant_of_empty_is_empty_aggregation() {
        let empty = AggregationResult::<String>::default();
        assert!(matches!(
            dominant(&empty),
            Err(EngineError::EmptyAggregation)
        ));
    }

    #[test]
    fn test_shares() {
        let input = agg(&[("Equipment", 30.0), ("Inputs", 10.0)]);
        let out = shares(&input);
        assert_eq!(out[0].share, Share::Percent(75.0));
        assert_eq!(out[1].share.percent(), Some(25.0));
    }

    #[test]
    fn test_shares_with_zero_total_are_not_applicable() {
        let input = agg(&[("Equipment", 0.0), ("Inputs", 0.0)]);
        assert!(shares(&input)
            .iter()
            .all(|e| e.share == Share::NotApplicable));
        assert_eq!(Share::of(1.0, 0.0), Share::NotApplicable);
    }
}
