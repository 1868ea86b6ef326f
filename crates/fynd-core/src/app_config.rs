use std::path::PathBuf;

/// Process-level configuration, loaded from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub exports_dir: PathBuf,

    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,

    pub blocket_base_url: String,
    pub blocket_request_timeout_secs: u64,
    pub blocket_user_agent: String,
    pub blocket_max_retries: u32,
    pub blocket_retry_backoff_base_ms: u64,
    pub blocket_max_pages: usize,

    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,

    pub pipeline: PipelineConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("exports_dir", &self.exports_dir)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("blocket_base_url", &self.blocket_base_url)
            .field(
                "blocket_request_timeout_secs",
                &self.blocket_request_timeout_secs,
            )
            .field("blocket_user_agent", &self.blocket_user_agent)
            .field("blocket_max_retries", &self.blocket_max_retries)
            .field(
                "blocket_retry_backoff_base_ms",
                &self.blocket_retry_backoff_base_ms,
            )
            .field("blocket_max_pages", &self.blocket_max_pages)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

/// Every tunable of the scoring pipeline, as named fields.
///
/// Components receive this at construction; nothing reads ambient global
/// state. Defaults carry the documented constants.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Confidence below this requires a clarifying question.
    pub confidence_threshold: f64,
    pub value_weight: f64,
    pub preference_weight: f64,
    pub risk_weight: f64,
    /// Max candidates surviving the filter.
    pub candidate_limit: usize,
    /// Minimum comparables for reliable market stats.
    pub min_comps: usize,
    /// Final top results to return.
    pub top_k: usize,
    /// Listings sampled for domain discovery.
    pub discovery_sample_size: usize,
    /// Half-width of the value-score band, as a percentage of the median.
    /// Price at `median * (1 - margin)` scores 100, at `median * (1 + margin)` scores 0.
    pub value_margin_pct: f64,
    pub penalty_short_description: f64,
    pub penalty_no_images: f64,
    pub penalty_new_account: f64,
    pub penalty_urgency_language: f64,
    /// Attributes comparable groups are keyed on, most specific first.
    pub comp_key_attributes: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.70,
            value_weight: 0.50,
            preference_weight: 0.35,
            risk_weight: 0.15,
            candidate_limit: 50,
            min_comps: 3,
            top_k: 10,
            discovery_sample_size: 30,
            value_margin_pct: 30.0,
            penalty_short_description: 20.0,
            penalty_no_images: 15.0,
            penalty_new_account: 10.0,
            penalty_urgency_language: 15.0,
            comp_key_attributes: vec!["storage_gb".to_string(), "condition".to_string()],
        }
    }
}

impl PipelineConfig {
    /// The fixed penalty for one risk flag.
    #[must_use]
    pub fn penalty_for(&self, flag: crate::enrichment::RiskFlag) -> f64 {
        use crate::enrichment::RiskFlag;
        match flag {
            RiskFlag::ShortDescription => self.penalty_short_description,
            RiskFlag::NoImages => self.penalty_no_images,
            RiskFlag::NewAccount => self.penalty_new_account,
            RiskFlag::UrgencyLanguage => self.penalty_urgency_language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::RiskFlag;

    #[test]
    fn defaults_carry_documented_constants() {
        let config = PipelineConfig::default();
        assert!((config.confidence_threshold - 0.70).abs() < f64::EPSILON);
        assert!((config.value_weight - 0.50).abs() < f64::EPSILON);
        assert!((config.preference_weight - 0.35).abs() < f64::EPSILON);
        assert!((config.risk_weight - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.candidate_limit, 50);
        assert_eq!(config.min_comps, 3);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.discovery_sample_size, 30);
    }

    #[test]
    fn weights_sum_to_one() {
        let config = PipelineConfig::default();
        let sum = config.value_weight + config.preference_weight + config.risk_weight;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn penalty_lookup_matches_fields() {
        let config = PipelineConfig::default();
        assert!((config.penalty_for(RiskFlag::ShortDescription) - 20.0).abs() < f64::EPSILON);
        assert!((config.penalty_for(RiskFlag::NoImages) - 15.0).abs() < f64::EPSILON);
        assert!((config.penalty_for(RiskFlag::NewAccount) - 10.0).abs() < f64::EPSILON);
        assert!((config.penalty_for(RiskFlag::UrgencyLanguage) - 15.0).abs() < f64::EPSILON);
    }
}
