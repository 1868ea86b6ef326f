use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Price of a listing: amount plus ISO currency code.
///
/// Blocket prices are always SEK in practice, but the currency is carried
/// explicitly so exports stay self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

impl Price {
    #[must_use]
    pub fn sek(amount: f64) -> Self {
        Self {
            amount,
            currency: "SEK".to_string(),
        }
    }
}

/// A listing in canonical shape, as produced by normalization.
///
/// `listing_id` is the marketplace's stable ad identifier — the same
/// underlying ad keeps the same id across fetches, which is what dedup
/// relies on. Immutable once created; lives for one fetch cycle and is
/// persisted only through an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedListing {
    pub listing_id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipping_available: Option<bool>,
    #[serde(default)]
    pub image_count: u32,
    pub fetched_at: DateTime<Utc>,
    /// Opaque raw API payload, kept for export verifiability.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl NormalizedListing {
    /// Lowercased title + description, the text enrichment patterns run
    /// against.
    #[must_use]
    pub fn search_text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.title, desc).to_lowercase(),
            None => self.title.to_lowercase(),
        }
    }

    /// Price amount if the listing has one.
    #[must_use]
    pub fn price_amount(&self) -> Option<f64> {
        self.price.as_ref().map(|p| p.amount)
    }
}
