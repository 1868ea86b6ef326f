//! Hard-constraint candidate filtering.

use std::cmp::Ordering;

use fynd_core::{NormalizedListing, PreferenceProfile};

/// Applies every hard constraint from the profile as an AND of
/// predicates, then bounds the survivors to `candidate_limit`.
///
/// When more than `candidate_limit` survive, the most recently published
/// listings are kept; ties go to the lower asking price. Listings with
/// no publish timestamp sort after any dated listing, and a missing
/// price sorts after any priced one. Zero survivors is a valid outcome,
/// not an error.
#[must_use]
pub fn filter_candidates(
    listings: Vec<NormalizedListing>,
    profile: &PreferenceProfile,
    candidate_limit: usize,
) -> Vec<NormalizedListing> {
    let mut survivors: Vec<NormalizedListing> = listings
        .into_iter()
        .filter(|l| passes_hard_constraints(l, profile))
        .collect();

    if survivors.len() > candidate_limit {
        survivors.sort_by(compare_recency_then_price);
        survivors.truncate(candidate_limit);
    }
    survivors
}

/// True when the listing satisfies every hard constraint in the profile.
///
/// Price bounds are inclusive and only verifiable against a priced
/// listing; an unpriced listing fails any price bound. Location matches
/// when the listing location contains one of the requested locations,
/// case-insensitively.
#[must_use]
pub fn passes_hard_constraints(listing: &NormalizedListing, profile: &PreferenceProfile) -> bool {
    if let Some(min) = profile.min_price {
        match listing.price_amount() {
            Some(amount) if amount >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = profile.max_price {
        match listing.price_amount() {
            Some(amount) if amount <= max => {}
            _ => return false,
        }
    }

    if !profile.locations.is_empty() {
        let Some(location) = &listing.location else {
            return false;
        };
        let location = location.to_lowercase();
        if !profile
            .locations
            .iter()
            .any(|wanted| location.contains(&wanted.to_lowercase()))
        {
            return false;
        }
    }

    if profile.require_shipping && listing.shipping_available != Some(true) {
        return false;
    }

    true
}

fn compare_recency_then_price(a: &NormalizedListing, b: &NormalizedListing) -> Ordering {
    // Newest first; undated listings last.
    let recency = match (a.published_at, b.published_at) {
        (Some(pa), Some(pb)) => pb.cmp(&pa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    if recency != Ordering::Equal {
        return recency;
    }
    // Cheapest first; unpriced listings last.
    match (a.price_amount(), b.price_amount()) {
        (Some(pa), Some(pb)) => pa.total_cmp(&pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
