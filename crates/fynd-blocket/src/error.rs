use thiserror::Error;

/// Failures talking to the Blocket search API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Blocket (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("pagination limit reached for query \"{query}\": exceeded {max_pages} pages")]
    PaginationLimit { query: String, max_pages: usize },
}

/// A raw listing record that fails the data contract.
///
/// Validation failures drop the offending record from the batch, never
/// the whole run; batch normalization counts and reports them.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("record has no listing identifier")]
    MissingListingId,

    #[error("record {listing_id} has no title")]
    MissingTitle { listing_id: String },

    #[error("record {listing_id} has a negative price {amount}")]
    NegativePrice { listing_id: String, amount: f64 },
}
