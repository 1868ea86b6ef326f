//! HTTP client and normalization for the Blocket search API.
//!
//! [`BlocketClient`] fetches raw search pages with retry and pagination;
//! [`normalize::normalize_batch`] converts raw ads into
//! [`fynd_core::NormalizedListing`], dropping (and counting) records that
//! fail the data contract.

mod client;
pub mod error;
pub mod normalize;
mod retry;
pub mod types;

pub use client::BlocketClient;
pub use error::{FetchError, ValidationError};
pub use normalize::{normalize_ad, normalize_batch, NormalizedBatch};
pub use types::{SearchMetadata, SearchResponse};
