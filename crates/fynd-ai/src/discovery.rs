//! Domain discovery: infer a product domain from a sample of listings.

use serde::Deserialize;

use fynd_core::{InferredDomain, NormalizedListing, PipelineConfig, PreferenceQuestion};

use crate::error::InferenceError;
use crate::llm::LlmClient;

const DISCOVERY_SYSTEM_PROMPT: &str = "\
You are an expert at analyzing marketplace listings. Given a sample of \
listing titles and prices, determine the product domain they belong to \
and how confident you are. If your confidence is low, you MUST supply a \
clarifying question for the buyer together with 2-5 answer options. \
Also suggest 4-8 preference questions that actually affect price or \
quality in this domain; each question's id names the attribute the \
answer constrains (for example storage_gb, condition). \
Use Swedish for user-facing text. Respond with a JSON object:\n\
{\"domain_label\": string, \"confidence\": number between 0 and 1, \
\"clarifying_question\": string or null, \"clarification_options\": [string], \
\"preference_questions\": [{\"id\": string, \"question\": string, \
\"options\": [string], \"why\": string}]}";

/// Wire contract for the inference response.
///
/// `needs_clarification` is deliberately absent: it is recomputed from
/// confidence and the configured threshold, never trusted from the model.
#[derive(Debug, Deserialize)]
struct DomainInferenceResponse {
    domain_label: String,
    confidence: f64,
    #[serde(default)]
    clarifying_question: Option<String>,
    #[serde(default)]
    clarification_options: Vec<String>,
    #[serde(default)]
    preference_questions: Vec<PreferenceQuestion>,
}

/// Infers the product domain from a bounded sample of listings.
///
/// Samples the first `discovery_sample_size` listings, asks the model
/// for a domain label and confidence, and validates the result against
/// the clarification contract: confidence below the threshold without a
/// question and at least one option is an error, not a default.
///
/// # Errors
///
/// - [`InferenceError::EmptySample`] — nothing to infer from.
/// - [`InferenceError::Deserialize`] — content is not the expected shape.
/// - [`InferenceError::Gate`] — the clarification contract is violated.
/// - Transport/API errors from the underlying client.
pub async fn discover_domain(
    llm: &LlmClient,
    listings: &[NormalizedListing],
    config: &PipelineConfig,
) -> Result<InferredDomain, InferenceError> {
    if listings.is_empty() {
        return Err(InferenceError::EmptySample);
    }

    let sample = &listings[..listings.len().min(config.discovery_sample_size)];
    let user_prompt = build_user_prompt(sample);

    tracing::info!(sample_size = sample.len(), "running domain discovery");

    let content = llm.chat_json(DISCOVERY_SYSTEM_PROMPT, &user_prompt).await?;

    let response: DomainInferenceResponse =
        serde_json::from_str(&content).map_err(|e| InferenceError::Deserialize {
            context: "domain inference content".to_string(),
            source: e,
        })?;

    let domain = InferredDomain::from_inference(
        response.domain_label,
        response.confidence,
        response.clarifying_question,
        response.clarification_options,
        config.confidence_threshold,
    )?
    .with_preference_questions(response.preference_questions);

    tracing::info!(
        domain = %domain.domain_label,
        confidence = domain.confidence,
        needs_clarification = domain.needs_clarification,
        preference_questions = domain.preference_questions.len(),
        "domain discovery completed"
    );

    Ok(domain)
}

fn build_user_prompt(sample: &[NormalizedListing]) -> String {
    let titles: Vec<String> = sample.iter().map(|l| format!("- {}", l.title)).collect();

    let prices: Vec<f64> = sample.iter().filter_map(NormalizedListing::price_amount).collect();
    let price_line = if prices.is_empty() {
        "(no prices)".to_string()
    } else {
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        format!("Range: {min:.0} - {max:.0} SEK")
    };

    format!(
        "Analyze these {count} listings and infer the product domain.\n\n\
         Sample titles:\n{titles}\n\nSample prices: {price_line}",
        count = sample.len(),
        titles = titles.join("\n"),
    )
}
