use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::listing::NormalizedListing;
use crate::preferences::PreferenceProfile;
use crate::scoring::RankedListing;
use crate::watch::SearchFilters;

/// Whether a run exported the full batch or only newly seen listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    Full,
    Delta,
}

/// Overall price picture across the fetched set, for export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_listings: usize,
    pub with_price: usize,
    pub median_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Metadata for one run, written once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub exported_at: DateTime<Utc>,
    pub query: String,
    #[serde(default)]
    pub watch_id: Option<Uuid>,
    pub filters: SearchFilters,
    pub preferences: PreferenceProfile,
    pub mode: ExportMode,
    /// Listings fetched before any filtering.
    pub total_fetched: usize,
    /// Candidates surviving the hard-constraint filter (pipeline runs).
    #[serde(default)]
    pub after_filter: usize,
    /// Candidates enriched (pipeline runs).
    #[serde(default)]
    pub enriched: usize,
    /// Raw records dropped for failing the data contract.
    #[serde(default)]
    pub dropped_invalid: usize,
    #[serde(default)]
    pub market_summary: Option<MarketSummary>,
}

/// The exported payload: plain listings for search/watch runs, ranked
/// results for pipeline runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ExportBody {
    Listings(Vec<NormalizedListing>),
    Ranked(Vec<RankedListing>),
}

impl ExportBody {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ExportBody::Listings(items) => items.len(),
            ExportBody::Ranked(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete run artifact: metadata plus the ordered result sequence.
///
/// Created once per run and written to durable storage as a single
/// immutable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullRunExport {
    pub metadata: RunMetadata,
    pub body: ExportBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Price;

    fn sample_export() -> FullRunExport {
        let listing = NormalizedListing {
            listing_id: "1001".to_string(),
            url: "https://www.blocket.se/annons/1001".to_string(),
            title: "iPhone 13 128GB".to_string(),
            description: Some("Nyskick, kvitto finns".to_string()),
            price: Some(Price::sek(5500.0)),
            location: Some("Stockholm".to_string()),
            published_at: Some("2026-08-20T10:00:00Z".parse().unwrap()),
            shipping_available: Some(true),
            image_count: 4,
            fetched_at: "2026-08-29T08:00:00Z".parse().unwrap(),
            raw: serde_json::json!({"ad_id": "1001"}),
        };
        FullRunExport {
            metadata: RunMetadata {
                run_id: Uuid::new_v4(),
                exported_at: "2026-08-29T08:00:01Z".parse().unwrap(),
                query: "iphone 13".to_string(),
                watch_id: None,
                filters: SearchFilters::default(),
                preferences: PreferenceProfile::default(),
                mode: ExportMode::Full,
                total_fetched: 1,
                after_filter: 0,
                enriched: 0,
                dropped_invalid: 0,
                market_summary: None,
            },
            body: ExportBody::Listings(vec![listing]),
        }
    }

    #[test]
    fn export_roundtrips_losslessly() {
        let export = sample_export();
        let json = serde_json::to_string_pretty(&export).unwrap();
        let back: FullRunExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, export);
    }

    #[test]
    fn body_kind_is_tagged() {
        let export = sample_export();
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["body"]["kind"], "listings");
        assert!(value["body"]["items"].is_array());
    }
}
