//! Blocket search API response types.
//!
//! ## Observed shape
//!
//! The search endpoint returns `{"docs": [...], "metadata": {...}}`.
//! Individual ads are loosely shaped and vary by category and API
//! version, so `docs` is kept as raw JSON values and field extraction
//! with fallbacks happens in [`crate::normalize`]:
//!
//! - **Identifier**: `ad_id`, `id`, or `listing_id`; numeric or string.
//! - **Title**: `subject` on newer responses, `heading`/`title` on older.
//! - **Price**: either a nested object `{"value": 7500, "currency": "SEK"}`,
//!   a bare number, or a display string like `"7 500 kr"`.
//! - **Location**: a plain string, or an object with `name`/`city`/`region`.
//! - **Published**: `timestamp` in epoch milliseconds, with string
//!   fallbacks (`list_time`, `published_at`, ...).
//! - **Shipping**: `shipping` as a bool or `{"available": true}`, or
//!   `can_be_shipped`.

use serde::Deserialize;

/// Top-level response from the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Raw ad records; normalization pulls fields out with fallbacks.
    #[serde(default)]
    pub docs: Vec<serde_json::Value>,

    #[serde(default)]
    pub metadata: SearchMetadata,
}

/// Paging metadata on a search response.
#[derive(Debug, Deserialize)]
pub struct SearchMetadata {
    /// Absent metadata is treated as the last page.
    #[serde(default = "default_end_of_paging")]
    pub is_end_of_paging: bool,
}

impl Default for SearchMetadata {
    fn default() -> Self {
        Self {
            is_end_of_paging: true,
        }
    }
}

fn default_end_of_paging() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metadata_means_end_of_paging() {
        let response: SearchResponse = serde_json::from_str(r#"{"docs": []}"#).unwrap();
        assert!(response.metadata.is_end_of_paging);
    }

    #[test]
    fn explicit_paging_flag_is_honored() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"docs": [], "metadata": {"is_end_of_paging": false}}"#)
                .unwrap();
        assert!(!response.metadata.is_end_of_paging);
    }
}
