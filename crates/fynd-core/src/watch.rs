use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::preferences::PreferenceProfile;

/// Sort order accepted by the Blocket search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Relevance,
    PriceAsc,
    PriceDesc,
    PublishedDesc,
    PublishedAsc,
}

impl SortOrder {
    /// Query-parameter value the API expects.
    #[must_use]
    pub fn as_api_param(self) -> &'static str {
        match self {
            SortOrder::Relevance => "rel",
            SortOrder::PriceAsc => "pri_asc",
            SortOrder::PriceDesc => "pri_desc",
            SortOrder::PublishedDesc => "dat_desc",
            SortOrder::PublishedAsc => "dat_asc",
        }
    }
}

/// Search-side filters for a watch or an ad-hoc search.
///
/// These narrow what the marketplace returns; preference-side filtering
/// happens later in the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

/// A saved, named search re-run over time.
///
/// The watch owns a monotonically growing set of previously seen listing
/// ids, persisted separately (see `fynd-db::seen_listings`). Mutated only
/// by re-save; deleted explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    pub id: Uuid,
    pub name: Option<String>,
    pub query: String,
    pub filters: SearchFilters,
    pub preferences: PreferenceProfile,
    pub created_at: DateTime<Utc>,
}
