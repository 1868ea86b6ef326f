//! Comparable grouping and market price statistics.

use fynd_core::{EnrichedListing, MarketStats};

/// Builds market stats for one candidate from the rest of the candidate
/// pool.
///
/// Grouping starts from the full comparable key (every attribute in
/// `comp_key_attributes` equal to the candidate's) and relaxes one
/// attribute per round, dropping the most specific first, until the
/// group reaches `min_comps` priced listings. The final round compares
/// against the whole pool. If even that is undersized the stats are
/// unavailable (`None`) — never computed from a tiny sample.
#[must_use]
pub fn find_comps(
    target: &EnrichedListing,
    pool: &[EnrichedListing],
    comp_key_attributes: &[String],
    min_comps: usize,
) -> Option<MarketStats> {
    for level in 0..=comp_key_attributes.len() {
        let active = &comp_key_attributes[level..];

        // A key attribute the candidate itself lacks cannot form a
        // group at this level; relax straight past it.
        if active
            .iter()
            .any(|attr| target.attribute_value(attr).is_none())
        {
            continue;
        }

        let prices: Vec<f64> = pool
            .iter()
            .filter(|other| other.listing_id() != target.listing_id())
            .filter(|other| {
                active.iter().all(|attr| {
                    match (target.attribute_value(attr), other.attribute_value(attr)) {
                        (Some(a), Some(b)) => values_match(a, b),
                        _ => false,
                    }
                })
            })
            .filter_map(|other| other.listing.price_amount())
            .filter(|amount| *amount > 0.0)
            .collect();

        if prices.len() >= min_comps {
            let comp_key = comp_key_label(target, active);
            let relaxation_level = u32::try_from(level).unwrap_or(u32::MAX);
            return market_stats(&prices, comp_key, relaxation_level);
        }
    }
    None
}

/// Robust price statistics over a non-empty price list.
///
/// Quartiles use linear interpolation between closest ranks, matching
/// the conventional definition; the caller is responsible for the
/// minimum-size gate.
#[must_use]
pub fn market_stats(
    prices: &[f64],
    comp_key: Option<String>,
    relaxation_level: u32,
) -> Option<MarketStats> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = percentile(&sorted, 0.25);
    let median = percentile(&sorted, 0.50);
    let q3 = percentile(&sorted, 0.75);

    Some(MarketStats {
        median,
        q1,
        q3,
        iqr: q3 - q1,
        min_price: sorted[0],
        max_price: sorted[sorted.len() - 1],
        n: sorted.len(),
        comp_key,
        relaxation_level,
    })
}

/// Linear-interpolated percentile over an already sorted slice.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = (sorted.len() - 1) as f64 * q;
    let lower = idx.floor() as usize;
    let upper = lower + 1;
    if upper >= sorted.len() {
        return sorted[lower];
    }
    sorted[lower] + (idx - lower as f64) * (sorted[upper] - sorted[lower])
}

fn comp_key_label(target: &EnrichedListing, active: &[String]) -> Option<String> {
    if active.is_empty() {
        return None;
    }
    let parts: Vec<String> = active
        .iter()
        .map(|attr| {
            let value = target
                .attribute_value(attr)
                .map_or_else(String::new, value_label);
            format!("{attr}={value}")
        })
        .collect();
    Some(parts.join("|"))
}

fn value_label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn values_match(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a, b) {
        (serde_json::Value::String(a), serde_json::Value::String(b)) => {
            a.eq_ignore_ascii_case(b)
        }
        _ => a == b,
    }
}
