//! Normalization from raw Blocket ads to [`NormalizedListing`].
//!
//! Raw ads are loosely shaped (see [`crate::types`]); every field is
//! extracted with fallbacks. A record without an identifier or title
//! violates the data contract and is dropped from the batch with a
//! [`ValidationError`] — the batch itself never fails.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use fynd_core::{NormalizedListing, Price};

use crate::error::ValidationError;

/// Result of normalizing one fetched batch.
#[derive(Debug)]
pub struct NormalizedBatch {
    pub listings: Vec<NormalizedListing>,
    /// Records dropped for failing the data contract.
    pub dropped: usize,
}

/// Normalizes a batch of raw ads, dropping and counting invalid records.
#[must_use]
pub fn normalize_batch(docs: &[Value], fetched_at: DateTime<Utc>) -> NormalizedBatch {
    let mut listings = Vec::with_capacity(docs.len());
    let mut dropped = 0usize;

    for doc in docs {
        match normalize_ad(doc, fetched_at) {
            Ok(listing) => listings.push(listing),
            Err(err) => {
                dropped += 1;
                tracing::warn!(error = %err, "dropping invalid listing record");
            }
        }
    }

    NormalizedBatch { listings, dropped }
}

/// Normalizes a single raw ad into a [`NormalizedListing`].
///
/// # Errors
///
/// Returns [`ValidationError`] if the record has no identifier, no
/// title, or a negative price.
pub fn normalize_ad(raw: &Value, fetched_at: DateTime<Utc>) -> Result<NormalizedListing, ValidationError> {
    let listing_id = extract_id(raw).ok_or(ValidationError::MissingListingId)?;

    let title = first_string(raw, &["subject", "heading", "title"]).ok_or_else(|| {
        ValidationError::MissingTitle {
            listing_id: listing_id.clone(),
        }
    })?;

    let url = first_string(raw, &["canonical_url", "share_url", "url"])
        .unwrap_or_else(|| format!("https://www.blocket.se/annons/{listing_id}"));

    let description = first_string(raw, &["body", "description"]);

    let price = extract_price(raw.get("price"));
    if let Some(p) = &price {
        if p.amount < 0.0 {
            return Err(ValidationError::NegativePrice {
                listing_id,
                amount: p.amount,
            });
        }
    }

    let location = extract_location(raw);
    let published_at = extract_published_at(raw);
    let shipping_available = extract_shipping(raw);

    let image_count = raw
        .get("images")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    Ok(NormalizedListing {
        listing_id,
        url,
        title,
        description,
        price,
        location,
        published_at,
        shipping_available,
        #[allow(clippy::cast_possible_truncation)]
        image_count: image_count as u32,
        fetched_at,
        raw: raw.clone(),
    })
}

/// Identifier from `ad_id`/`id`/`listing_id`, numeric or string.
fn extract_id(raw: &Value) -> Option<String> {
    for key in ["ad_id", "id", "listing_id"] {
        match raw.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn first_string(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| raw.get(k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Price from a nested object, a bare number, or a display string.
fn extract_price(value: Option<&Value>) -> Option<Price> {
    match value? {
        Value::Object(map) => {
            let amount = map
                .get("value")
                .or_else(|| map.get("amount"))
                .and_then(Value::as_f64)?;
            let currency = map
                .get("currency")
                .and_then(Value::as_str)
                .unwrap_or("SEK")
                .to_string();
            Some(Price { amount, currency })
        }
        Value::Number(n) => n.as_f64().map(Price::sek),
        Value::String(s) => {
            // Display strings like "7 500 kr" or "7,500 SEK".
            let cleaned: String = s
                .replace("kr", "")
                .replace("SEK", "")
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .collect();
            cleaned.parse::<f64>().ok().map(Price::sek)
        }
        _ => None,
    }
}

fn extract_location(raw: &Value) -> Option<String> {
    match raw.get("location") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Object(map)) => {
            for key in ["name", "city", "region"] {
                if let Some(s) = map.get(key).and_then(Value::as_str) {
                    return Some(s.to_string());
                }
            }
        }
        _ => {}
    }
    first_string(raw, &["location_name", "municipality", "region"])
}

/// Published time from `timestamp` (epoch milliseconds) with string
/// fallbacks parsed as RFC 3339.
fn extract_published_at(raw: &Value) -> Option<DateTime<Utc>> {
    if let Some(ts_ms) = raw.get("timestamp").and_then(Value::as_i64) {
        if let Some(dt) = Utc.timestamp_millis_opt(ts_ms).single() {
            return Some(dt);
        }
    }

    for key in ["list_time", "published", "published_at", "created", "created_at", "date"] {
        if let Some(s) = raw.get(key).and_then(Value::as_str) {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
        }
    }
    None
}

fn extract_shipping(raw: &Value) -> Option<bool> {
    match raw.get("shipping") {
        Some(Value::Bool(b)) => return Some(*b),
        Some(Value::Object(map)) => {
            let available = map
                .get("available")
                .or_else(|| map.get("enabled"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            return Some(available);
        }
        _ => {}
    }
    raw.get("can_be_shipped").and_then(Value::as_bool)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
