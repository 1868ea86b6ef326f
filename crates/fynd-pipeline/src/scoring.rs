//! Value, preference, and risk scoring, and final ranking.

use std::cmp::Ordering;

use fynd_core::{
    ConstraintKind, EnrichedListing, MarketStats, PipelineConfig, PreferenceCriterion,
    PreferenceProfile, RankedListing, ScoringBreakdown,
};

const NEUTRAL_SCORE: f64 = 50.0;

/// Value score: how the asking price sits against the market median.
///
/// Linear in price over the band `median * (1 ± margin)`: at or below
/// the lower edge scores 100, at or above the upper edge scores 0, the
/// median itself scores exactly 50. Unavailable market stats or an
/// unpriced listing score the neutral 50.
#[must_use]
pub fn value_score(price: Option<f64>, stats: Option<&MarketStats>, margin_pct: f64) -> f64 {
    let (Some(price), Some(stats)) = (price, stats) else {
        return NEUTRAL_SCORE;
    };
    if stats.median <= 0.0 || margin_pct <= 0.0 {
        return NEUTRAL_SCORE;
    }
    let band = stats.median * margin_pct / 100.0;
    let raw = NEUTRAL_SCORE + (stats.median - price) / band * NEUTRAL_SCORE;
    raw.clamp(0.0, 100.0)
}

/// Preference satisfaction plus which criteria matched.
pub struct PreferenceMatch {
    pub score: f64,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Preference score: the fraction of soft criteria satisfied, scaled to
/// 0-100. A profile with no soft criteria scores 100 — nothing asked
/// for, nothing missed. An attribute enrichment could not extract
/// counts as unsatisfied.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn preference_match(enriched: &EnrichedListing, profile: &PreferenceProfile) -> PreferenceMatch {
    let criteria = profile.all_soft_criteria();
    if criteria.is_empty() {
        return PreferenceMatch {
            score: 100.0,
            matched: Vec::new(),
            unmatched: Vec::new(),
        };
    }

    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for criterion in &criteria {
        if criterion_satisfied(enriched, criterion) {
            matched.push(criterion.attribute.clone());
        } else {
            unmatched.push(criterion.attribute.clone());
        }
    }

    let score = matched.len() as f64 / criteria.len() as f64 * 100.0;
    PreferenceMatch {
        score,
        matched,
        unmatched,
    }
}

fn criterion_satisfied(enriched: &EnrichedListing, criterion: &PreferenceCriterion) -> bool {
    let Some(actual) = enriched.attribute_value(&criterion.attribute) else {
        return false;
    };
    match criterion.constraint {
        ConstraintKind::Equals => match (actual.as_str(), criterion.value.as_str()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => actual == &criterion.value,
        },
        ConstraintKind::Min => match (actual.as_f64(), criterion.value.as_f64()) {
            (Some(a), Some(min)) => a >= min,
            _ => false,
        },
        ConstraintKind::Max => match (actual.as_f64(), criterion.value.as_f64()) {
            (Some(a), Some(max)) => a <= max,
            _ => false,
        },
        ConstraintKind::Contains => match (actual.as_str(), criterion.value.as_str()) {
            (Some(a), Some(needle)) => a.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        },
    }
}

/// Risk score: 100 minus a fixed penalty per present flag, floored at 0.
/// Flags are independent and their penalties stack.
#[must_use]
pub fn risk_score(enriched: &EnrichedListing, config: &PipelineConfig) -> f64 {
    let penalty: f64 = enriched
        .risk_flags
        .iter()
        .map(|flag| config.penalty_for(*flag))
        .sum();
    (100.0 - penalty).max(0.0)
}

/// Produces the full breakdown for one candidate.
#[must_use]
pub fn score_candidate(
    enriched: &EnrichedListing,
    stats: Option<&MarketStats>,
    profile: &PreferenceProfile,
    config: &PipelineConfig,
) -> ScoringBreakdown {
    let value = value_score(enriched.listing.price_amount(), stats, config.value_margin_pct);
    let preference = preference_match(enriched, profile);
    let risk = risk_score(enriched, config);

    let mut breakdown = ScoringBreakdown::new(
        value,
        preference.score,
        risk,
        config.value_weight,
        config.preference_weight,
        config.risk_weight,
    );
    breakdown.matched_preferences = preference.matched;
    breakdown.unmatched_preferences = preference.unmatched;
    breakdown
}

/// Sorts scored candidates by total descending, breaks ties by ascending
/// price (unpriced last), and keeps the top `top_k` with 1-based ranks.
#[must_use]
pub fn rank_candidates(
    mut scored: Vec<(EnrichedListing, Option<MarketStats>, ScoringBreakdown)>,
    top_k: usize,
) -> Vec<RankedListing> {
    scored.sort_by(|a, b| {
        match b.2.total.total_cmp(&a.2.total) {
            Ordering::Equal => {}
            other => return other,
        }
        match (a.0.listing.price_amount(), b.0.listing.price_amount()) {
            (Some(pa), Some(pb)) => pa.total_cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    scored.truncate(top_k);
    scored
        .into_iter()
        .enumerate()
        .map(|(i, (enriched, market_stats, scores))| RankedListing {
            rank: u32::try_from(i + 1).unwrap_or(u32::MAX),
            enriched,
            market_stats,
            scores,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fynd_core::{NormalizedListing, Price, RiskFlag};
    use std::collections::{BTreeMap, BTreeSet};

    fn enriched(id: &str, price: Option<f64>) -> EnrichedListing {
        EnrichedListing {
            listing: NormalizedListing {
                listing_id: id.to_string(),
                url: format!("https://www.blocket.se/annons/{id}"),
                title: format!("Listing {id}"),
                description: Some("En fin pryl i gott skick med kvitto".to_string()),
                price: price.map(Price::sek),
                location: None,
                published_at: None,
                shipping_available: None,
                image_count: 2,
                fetched_at: Utc::now(),
                raw: serde_json::Value::Null,
            },
            attributes: BTreeMap::new(),
            extraction_confidence: 0.9,
            missing_fields: Vec::new(),
            trust_signals: Vec::new(),
            seller_questions: Vec::new(),
            risk_flags: BTreeSet::new(),
        }
    }

    fn with_attribute(mut e: EnrichedListing, name: &str, value: serde_json::Value) -> EnrichedListing {
        e.attributes.insert(
            name.to_string(),
            fynd_core::ExtractedAttribute {
                name: name.to_string(),
                value,
                confidence: 0.9,
                evidence: None,
            },
        );
        e
    }

    fn stats(median: f64) -> MarketStats {
        MarketStats {
            median,
            q1: median * 0.9,
            q3: median * 1.1,
            iqr: median * 0.2,
            min_price: median * 0.8,
            max_price: median * 1.2,
            n: 5,
            comp_key: None,
            relaxation_level: 0,
        }
    }

    #[test]
    fn value_score_at_median_is_the_midpoint() {
        let s = stats(1000.0);
        assert!((value_score(Some(1000.0), Some(&s), 30.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn value_score_is_monotonically_non_increasing_in_price() {
        let s = stats(1000.0);
        let mut previous = f64::INFINITY;
        for price in [500, 700, 900, 1000, 1100, 1300, 1500] {
            let score = value_score(Some(f64::from(price)), Some(&s), 30.0);
            assert!(
                score <= previous,
                "score rose from {previous} to {score} at price {price}"
            );
            previous = score;
        }
    }

    #[test]
    fn value_score_saturates_at_the_margin_edges() {
        let s = stats(1000.0);
        assert!((value_score(Some(700.0), Some(&s), 30.0) - 100.0).abs() < 1e-9);
        assert!(value_score(Some(1300.0), Some(&s), 30.0).abs() < 1e-9);
        assert!((value_score(Some(500.0), Some(&s), 30.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unavailable_stats_score_neutral_fifty() {
        assert!((value_score(Some(123.0), None, 30.0) - 50.0).abs() < f64::EPSILON);
        let s = stats(1000.0);
        assert!((value_score(None, Some(&s), 30.0) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_soft_criteria_means_perfect_preference_score() {
        let m = preference_match(&enriched("1", None), &PreferenceProfile::default());
        assert!((m.score - 100.0).abs() < f64::EPSILON);
        assert!(m.matched.is_empty());
    }

    #[test]
    fn preference_score_is_fraction_satisfied() {
        let e = with_attribute(
            enriched("1", None),
            "storage_gb",
            serde_json::json!(128),
        );
        let profile = PreferenceProfile {
            soft_criteria: vec![
                PreferenceCriterion {
                    attribute: "storage_gb".to_string(),
                    value: serde_json::json!(64),
                    constraint: ConstraintKind::Min,
                },
                PreferenceCriterion {
                    attribute: "battery_health".to_string(),
                    value: serde_json::json!(80),
                    constraint: ConstraintKind::Min,
                },
            ],
            ..PreferenceProfile::default()
        };

        let m = preference_match(&e, &profile);
        assert!((m.score - 50.0).abs() < f64::EPSILON);
        assert_eq!(m.matched, vec!["storage_gb"]);
        assert_eq!(m.unmatched, vec!["battery_health"]);
    }

    #[test]
    fn missing_attribute_counts_as_unsatisfied() {
        let profile = PreferenceProfile {
            soft_criteria: vec![PreferenceCriterion {
                attribute: "color".to_string(),
                value: serde_json::json!("svart"),
                constraint: ConstraintKind::Equals,
            }],
            ..PreferenceProfile::default()
        };
        let m = preference_match(&enriched("1", None), &profile);
        assert!(m.score.abs() < f64::EPSILON);
    }

    #[test]
    fn equals_on_strings_ignores_case_and_contains_is_substring() {
        let e = with_attribute(
            enriched("1", None),
            "model_variant",
            serde_json::json!("Pro Max"),
        );
        let equals = PreferenceCriterion {
            attribute: "model_variant".to_string(),
            value: serde_json::json!("pro max"),
            constraint: ConstraintKind::Equals,
        };
        let contains = PreferenceCriterion {
            attribute: "model_variant".to_string(),
            value: serde_json::json!("max"),
            constraint: ConstraintKind::Contains,
        };
        assert!(criterion_satisfied(&e, &equals));
        assert!(criterion_satisfied(&e, &contains));
    }

    #[test]
    fn risk_penalties_stack() {
        let mut e = enriched("1", None);
        e.risk_flags.insert(RiskFlag::ShortDescription);
        e.risk_flags.insert(RiskFlag::NoImages);
        let score = risk_score(&e, &PipelineConfig::default());
        assert!((score - 65.0).abs() < f64::EPSILON);
    }

    #[test]
    fn risk_score_floors_at_zero() {
        let mut e = enriched("1", None);
        e.risk_flags.insert(RiskFlag::ShortDescription);
        e.risk_flags.insert(RiskFlag::NoImages);
        e.risk_flags.insert(RiskFlag::NewAccount);
        e.risk_flags.insert(RiskFlag::UrgencyLanguage);
        let config = PipelineConfig {
            penalty_short_description: 60.0,
            penalty_no_images: 60.0,
            ..PipelineConfig::default()
        };
        assert!(risk_score(&e, &config).abs() < f64::EPSILON);
    }

    #[test]
    fn total_combines_components_under_fixed_weights() {
        // value 80, preference 60, risk 100 -> 40 + 21 + 15 = 76
        let b = ScoringBreakdown::new(80.0, 60.0, 100.0, 0.50, 0.35, 0.15);
        assert!((b.total - 76.0).abs() < 1e-9);
    }

    #[test]
    fn two_comps_below_minimum_yield_neutral_value_score() {
        let target = enriched("t", Some(5000.0));
        let pool = vec![enriched("a", Some(100.0)), enriched("b", Some(100.0))];
        let config = PipelineConfig::default();

        let stats = crate::comps::find_comps(
            &target,
            &pool,
            &config.comp_key_attributes,
            config.min_comps,
        );
        assert!(stats.is_none());
        let score = value_score(
            target.listing.price_amount(),
            stats.as_ref(),
            config.value_margin_pct,
        );
        assert!((score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_sorts_by_total_then_ascending_price() {
        let config = PipelineConfig::default();
        let profile = PreferenceProfile::default();

        let cheap = enriched("cheap", Some(100.0));
        let pricey = enriched("pricey", Some(200.0));
        let cheap_scores = score_candidate(&cheap, None, &profile, &config);
        let pricey_scores = score_candidate(&pricey, None, &profile, &config);
        assert!((cheap_scores.total - pricey_scores.total).abs() < f64::EPSILON);

        let ranked = rank_candidates(
            vec![(pricey, None, pricey_scores), (cheap, None, cheap_scores)],
            10,
        );
        assert_eq!(ranked[0].enriched.listing_id(), "cheap");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].enriched.listing_id(), "pricey");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn ranking_truncates_to_top_k() {
        let config = PipelineConfig::default();
        let profile = PreferenceProfile::default();
        let scored: Vec<_> = (0..15)
            .map(|i| {
                let e = enriched(&i.to_string(), Some(f64::from(i) * 10.0));
                let s = score_candidate(&e, None, &profile, &config);
                (e, None, s)
            })
            .collect();

        let ranked = rank_candidates(scored, 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked.last().map(|r| r.rank), Some(10));
    }
}
