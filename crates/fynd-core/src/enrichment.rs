use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::listing::NormalizedListing;

/// A red-flag condition detected on a listing.
///
/// Each flag carries a fixed point penalty (configured in
/// `PipelineConfig`); flags are independent and penalties stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    ShortDescription,
    NoImages,
    NewAccount,
    UrgencyLanguage,
}

impl std::fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskFlag::ShortDescription => "short_description",
            RiskFlag::NoImages => "no_images",
            RiskFlag::NewAccount => "new_account",
            RiskFlag::UrgencyLanguage => "urgency_language",
        };
        write!(f, "{label}")
    }
}

/// One attribute pulled out of a listing's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAttribute {
    pub name: String,
    pub value: serde_json::Value,
    /// Extraction confidence in `[0, 1]`.
    pub confidence: f64,
    /// The text span the value came from, when the extractor has one.
    #[serde(default)]
    pub evidence: Option<String>,
}

/// A ready-to-send question for the seller, generated for missing info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerQuestion {
    pub question: String,
    pub reason: String,
    /// The missing field or risk this question addresses.
    pub relates_to: String,
}

/// A [`NormalizedListing`] plus everything enrichment extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedListing {
    pub listing: NormalizedListing,
    /// Attribute name → extracted value.
    #[serde(default)]
    pub attributes: BTreeMap<String, ExtractedAttribute>,
    /// Mean confidence across extracted attributes.
    pub extraction_confidence: f64,
    /// Critical attributes that could not be extracted.
    #[serde(default)]
    pub missing_fields: Vec<String>,
    /// Positive indicators found in the text (kvitto, garanti, ...).
    #[serde(default)]
    pub trust_signals: Vec<String>,
    #[serde(default)]
    pub seller_questions: Vec<SellerQuestion>,
    #[serde(default)]
    pub risk_flags: BTreeSet<RiskFlag>,
}

impl EnrichedListing {
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name).map(|a| &a.value)
    }

    #[must_use]
    pub fn listing_id(&self) -> &str {
        &self.listing.listing_id
    }
}
