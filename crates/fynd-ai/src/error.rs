use thiserror::Error;

use fynd_core::DomainGateError;

/// Failures of the domain-inference collaborator.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("no OpenAI API key configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("inference response had no content")]
    EmptyResponse,

    #[error("malformed inference response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot infer a domain from an empty listing sample")]
    EmptySample,

    #[error("inference response violates the clarification contract: {0}")]
    Gate(#[from] DomainGateError),
}
