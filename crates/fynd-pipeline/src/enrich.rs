//! Deterministic listing enrichment: attribute extraction, trust and
//! risk signals, and seller questions for missing info.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use tracing::debug;

use fynd_core::{
    EnrichedListing, ExtractedAttribute, NormalizedListing, PipelineConfig, RiskFlag,
    SellerQuestion,
};

/// Confidence assigned to a direct pattern match.
const PATTERN_CONFIDENCE: f64 = 0.9;
/// Confidence reported when nothing could be extracted.
const NO_EXTRACTION_CONFIDENCE: f64 = 0.3;
/// Descriptions shorter than this are flagged as low-information.
const MIN_DESCRIPTION_CHARS: usize = 20;

/// Positive indicators sellers mention, Swedish marketplace vocabulary.
const TRUST_SIGNALS: &[&str] = &[
    "kvitto",
    "garanti",
    "originalförpackning",
    "olåst",
    "aldrig använd",
    "nyskick",
    "oanvänd",
];

/// Urgency wording that correlates with scams, Swedish + English.
const URGENCY_PATTERNS: &[&str] = &[
    r"\bsnabb\s*(affär|försäljning)\b",
    r"\bmåste\s*(bort|sälja|säljas)\b",
    r"\bakut\b",
    r"\bsnarast\b",
    r"\bförst\s*till\s*kvarn\b",
    r"\bsista\s*chans\b",
    r"\bquick\s*sale\b",
    r"\bmust\s*(go|sell)\b",
    r"\burgent\b",
];

/// Condition labels in priority order; multi-word forms first so
/// `som ny` is not swallowed by the bare `ny` pattern.
const CONDITION_PATTERNS: &[(&str, &str)] = &[
    (r"\b(som\s*ny|nyskick|felfri)\b", "som ny"),
    (r"\b(defekt|trasig|sönder)\b", "defekt"),
    (r"\b(bra\s*skick|gott\s*skick|fint\s*skick)\b", "bra"),
    (r"\b(ok\s*skick|okej\s*skick|använd)\b", "ok"),
    (r"\b(helt\s*ny|ny)\b", "ny"),
];

/// Extracts structured attributes from listing text with regex patterns
/// and derives trust signals, risk flags, and seller questions.
///
/// Patterns are compiled once at construction; the enricher is reused
/// across the whole candidate set.
pub struct Enricher {
    storage: Regex,
    battery: Vec<Regex>,
    year: Regex,
    model_variant: Regex,
    conditions: Vec<(Regex, &'static str)>,
    urgency: Vec<Regex>,
    critical_attributes: Vec<String>,
}

impl Enricher {
    /// Critical attributes are `condition` plus whatever the comparable
    /// key is built on; a candidate missing one gets it reported in
    /// `missing_fields` and a seller question generated.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        let mut critical_attributes = vec!["condition".to_string()];
        for attr in &config.comp_key_attributes {
            if !critical_attributes.contains(attr) {
                critical_attributes.push(attr.clone());
            }
        }

        Self {
            storage: compile(r"(\d+)\s*gb\b"),
            battery: vec![
                compile(r"batterihälsa[:\s]*(\d{1,3})"),
                compile(r"batteri[:\s]*(\d{1,3})\s*%"),
                compile(r"battery\s*(?:health)?[:\s]*(\d{1,3})\s*%"),
            ],
            year: compile(r"\b(20[0-2][0-9])\b"),
            model_variant: compile(r"\b(pro\s*max|pro|plus|mini|ultra)\b"),
            conditions: CONDITION_PATTERNS
                .iter()
                .map(|(pattern, label)| (compile(pattern), *label))
                .collect(),
            urgency: URGENCY_PATTERNS.iter().map(|p| compile(p)).collect(),
            critical_attributes,
        }
    }

    /// Enriches one listing. Pure text analysis, no network calls.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn enrich(&self, listing: NormalizedListing) -> EnrichedListing {
        let text = listing.search_text();

        let attributes = self.extract_attributes(&text);
        let extraction_confidence = if attributes.is_empty() {
            NO_EXTRACTION_CONFIDENCE
        } else {
            attributes.values().map(|a| a.confidence).sum::<f64>() / attributes.len() as f64
        };

        let missing_fields: Vec<String> = self
            .critical_attributes
            .iter()
            .filter(|attr| !attributes.contains_key(*attr))
            .cloned()
            .collect();
        let seller_questions = seller_questions_for(&missing_fields);

        let trust_signals: Vec<String> = TRUST_SIGNALS
            .iter()
            .filter(|signal| text.contains(*signal))
            .map(|s| (*s).to_string())
            .collect();

        let risk_flags = self.detect_risks(&listing, &text);

        debug!(
            listing_id = %listing.listing_id,
            attributes = attributes.len(),
            risk_flags = risk_flags.len(),
            "enriched listing"
        );

        EnrichedListing {
            listing,
            attributes,
            extraction_confidence,
            missing_fields,
            trust_signals,
            seller_questions,
            risk_flags,
        }
    }

    pub fn enrich_batch(&self, listings: Vec<NormalizedListing>) -> Vec<EnrichedListing> {
        listings.into_iter().map(|l| self.enrich(l)).collect()
    }

    fn extract_attributes(&self, text: &str) -> BTreeMap<String, ExtractedAttribute> {
        let mut attributes = BTreeMap::new();

        if let Some((value, evidence)) = capture_u64(&self.storage, text) {
            insert(&mut attributes, "storage_gb", serde_json::json!(value), evidence);
        }

        for pattern in &self.battery {
            if let Some((value, evidence)) = capture_u64(pattern, text) {
                if value <= 100 {
                    insert(
                        &mut attributes,
                        "battery_health",
                        serde_json::json!(value),
                        evidence,
                    );
                }
                break;
            }
        }

        for (pattern, label) in &self.conditions {
            if let Some(m) = pattern.find(text) {
                insert(
                    &mut attributes,
                    "condition",
                    serde_json::json!(label),
                    m.as_str().to_string(),
                );
                break;
            }
        }

        if let Some((value, evidence)) = capture_u64(&self.year, text) {
            insert(&mut attributes, "year", serde_json::json!(value), evidence);
        }

        if let Some(captures) = self.model_variant.captures(text) {
            if let Some(m) = captures.get(1) {
                let variant = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
                insert(
                    &mut attributes,
                    "model_variant",
                    serde_json::json!(variant),
                    m.as_str().to_string(),
                );
            }
        }

        attributes
    }

    fn detect_risks(&self, listing: &NormalizedListing, text: &str) -> BTreeSet<RiskFlag> {
        let mut flags = BTreeSet::new();

        let description_chars = listing
            .description
            .as_ref()
            .map_or(0, |d| d.chars().count());
        if description_chars < MIN_DESCRIPTION_CHARS {
            flags.insert(RiskFlag::ShortDescription);
        }

        if listing.image_count == 0 {
            flags.insert(RiskFlag::NoImages);
        }

        if self.urgency.iter().any(|p| p.is_match(text)) {
            flags.insert(RiskFlag::UrgencyLanguage);
        }

        // The API marks freshly registered sellers in the raw payload.
        if listing
            .raw
            .pointer("/advertiser/new_account")
            .and_then(serde_json::Value::as_bool)
            == Some(true)
        {
            flags.insert(RiskFlag::NewAccount);
        }

        flags
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid enrichment regex")
}

fn capture_u64(pattern: &Regex, text: &str) -> Option<(u64, String)> {
    let captures = pattern.captures(text)?;
    let value: u64 = captures.get(1)?.as_str().parse().ok()?;
    let evidence = captures.get(0)?.as_str().to_string();
    Some((value, evidence))
}

fn insert(
    attributes: &mut BTreeMap<String, ExtractedAttribute>,
    name: &str,
    value: serde_json::Value,
    evidence: String,
) {
    attributes.insert(
        name.to_string(),
        ExtractedAttribute {
            name: name.to_string(),
            value,
            confidence: PATTERN_CONFIDENCE,
            evidence: Some(evidence),
        },
    );
}

fn seller_questions_for(missing_fields: &[String]) -> Vec<SellerQuestion> {
    missing_fields
        .iter()
        .filter_map(|field| {
            let (question, reason) = match field.as_str() {
                "condition" => (
                    "Vilket skick är produkten i? Några repor eller skador?",
                    "Skick påverkar värdet och livslängden",
                ),
                "battery_health" => (
                    "Vad är batterihälsan (i procent)?",
                    "Batterihälsa påverkar användbarhet och värde",
                ),
                "storage_gb" => (
                    "Hur mycket lagringsutrymme har den?",
                    "Lagring påverkar prisvärdering",
                ),
                "model_variant" => (
                    "Vilken exakt modell är det?",
                    "Modell påverkar funktioner och marknadsvärde",
                ),
                _ => return None,
            };
            Some(SellerQuestion {
                question: question.to_string(),
                reason: reason.to_string(),
                relates_to: field.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
