use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::AnalyticsMode;

/// Post-index analytics results (§4.10): PageRank (or its degree-based
/// fallback) plus dependency depth, keyed by `entityId`, ready for writeback.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyticsResult {
    pub page_rank: HashMap<String, f64>,
    pub dependency_depth: HashMap<String, u32>,
    pub mode: Option<AnalyticsMode>,
}

impl AnalyticsResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.page_rank.is_empty() && self.dependency_depth.is_empty()
    }
}

/// Normalizes a raw degree-based score map to `[0, 1]` by dividing by the
/// maximum observed value, the last step of the degree fallback (§4.10).
pub fn normalize_to_unit_range(scores: HashMap<String, f64>) -> HashMap<String, f64> {
    let max = scores.values().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return scores;
    }
    scores.into_iter().map(|(k, v)| (k, v / max)).collect()
}

/// `inDegree / totalEdges + 0.15`, the fallback formula from §4.10, prior to
/// normalization.
pub fn degree_fallback_score(in_degree: u64, total_edges: u64) -> f64 {
    if total_edges == 0 {
        0.15
    } else {
        (in_degree as f64 / total_edges as f64) + 0.15
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_fallback_matches_spec_formula() {
        let score = degree_fallback_score(5, 20);
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn degree_fallback_handles_zero_edges() {
        assert_eq!(degree_fallback_score(0, 0), 0.15);
    }

    #[test]
    fn normalize_scales_by_max() {
        let mut scores = HashMap::new();
        scores.insert("a".to_string(), 0.4);
        scores.insert("b".to_string(), 0.2);
        let normalized = normalize_to_unit_range(scores);
        assert!((normalized["a"] - 1.0).abs() < 1e-9);
        assert!((normalized["b"] - 0.5).abs() < 1e-9);
    }
}
