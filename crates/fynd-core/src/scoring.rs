use serde::{Deserialize, Serialize};

use crate::enrichment::EnrichedListing;

/// Price statistics for a comparable group.
///
/// Only ever constructed from a group that met the minimum comparable
/// count; an undersized group yields no `MarketStats` at all (`None` at
/// the call site), never a zeroed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Number of comparables contributing.
    pub n: usize,
    /// Attribute key the group was built on, e.g. `storage_gb=128|condition=bra`.
    #[serde(default)]
    pub comp_key: Option<String>,
    /// How many times grouping was relaxed to reach the minimum.
    #[serde(default)]
    pub relaxation_level: u32,
}

/// Score components and their weighted total.
///
/// Components are each 0–100. The total is always recomputable as
/// `value*w_v + preference*w_p + risk*w_r`; it is stored at full
/// precision and rounded only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringBreakdown {
    pub value_score: f64,
    pub preference_score: f64,
    pub risk_score: f64,
    pub total: f64,
    pub value_weight: f64,
    pub preference_weight: f64,
    pub risk_weight: f64,
    #[serde(default)]
    pub matched_preferences: Vec<String>,
    #[serde(default)]
    pub unmatched_preferences: Vec<String>,
}

impl ScoringBreakdown {
    /// Combines components under the given weights.
    #[must_use]
    pub fn new(
        value_score: f64,
        preference_score: f64,
        risk_score: f64,
        value_weight: f64,
        preference_weight: f64,
        risk_weight: f64,
    ) -> Self {
        let total = value_score * value_weight
            + preference_score * preference_weight
            + risk_score * risk_weight;
        Self {
            value_score,
            preference_score,
            risk_score,
            total,
            value_weight,
            preference_weight,
            risk_weight,
            matched_preferences: Vec::new(),
            unmatched_preferences: Vec::new(),
        }
    }

    /// Total rounded to the nearest integer, for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn total_display(&self) -> i64 {
        self.total.round() as i64
    }
}

/// A scored candidate with its final rank position.
///
/// Rank ordering is a strict descending sort on total, ties broken by
/// lower asking price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedListing {
    pub rank: u32,
    pub enriched: EnrichedListing,
    #[serde(default)]
    pub market_stats: Option<MarketStats>,
    pub scores: ScoringBreakdown,
}
