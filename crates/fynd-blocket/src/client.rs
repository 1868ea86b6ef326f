//! HTTP client for the Blocket search API.

use std::time::Duration;

use reqwest::Client;

use fynd_core::SearchFilters;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::types::SearchResponse;

/// HTTP client for Blocket's public search endpoint.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx
/// responses as typed errors. Transient errors (429, 5xx, network
/// failures) are retried with exponential backoff up to `max_retries`
/// additional attempts.
pub struct BlocketClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
    /// Page guard for [`Self::search_all`]; prevents runaway loops on a
    /// paging flag that never flips.
    max_pages: usize,
}

impl BlocketClient {
    /// Creates a `BlocketClient` with configured timeout, `User-Agent`,
    /// and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        max_pages: usize,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            backoff_base_ms,
            max_pages,
        })
    }

    /// Fetches one page of search results, with automatic retry on
    /// transient errors.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`FetchError::NotFound`] — HTTP 404 (not retried).
    /// - [`FetchError::UnexpectedStatus`] — any other non-2xx status (5xx retried, 4xx not).
    /// - [`FetchError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`FetchError::Deserialize`] — response body is not valid JSON (not retried).
    pub async fn search_page(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: usize,
    ) -> Result<SearchResponse, FetchError> {
        let url = self.search_url(query, filters, page)?;
        let max_retries = self.max_retries;
        let backoff_base_ms = self.backoff_base_ms;

        retry_with_backoff(max_retries, backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(FetchError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(FetchError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(FetchError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<SearchResponse>(&body).map_err(|e| {
                    FetchError::Deserialize {
                        context: format!("search page {page}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Fetches all pages for a query until the API signals end of paging.
    ///
    /// All-or-nothing: a failure on any page discards the pages already
    /// fetched and returns the error. Partial batches would corrupt
    /// delta comparisons downstream.
    ///
    /// # Errors
    ///
    /// Propagates any [`FetchError`] from [`Self::search_page`], and
    /// returns [`FetchError::PaginationLimit`] if the loop exceeds the
    /// configured page guard.
    pub async fn search_all(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<serde_json::Value>, FetchError> {
        let mut docs = Vec::new();
        let mut page = 1usize;

        loop {
            if page > self.max_pages {
                return Err(FetchError::PaginationLimit {
                    query: query.to_string(),
                    max_pages: self.max_pages,
                });
            }

            let response = self.search_page(query, filters, page).await?;
            let page_empty = response.docs.is_empty();
            docs.extend(response.docs);

            tracing::debug!(query, page, total = docs.len(), "fetched search page");

            if response.metadata.is_end_of_paging || page_empty {
                break;
            }
            page += 1;
        }

        tracing::info!(query, pages = page, listings = docs.len(), "search completed");
        Ok(docs)
    }

    /// Builds the search URL for the given query, filters, and page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if the configured base URL
    /// cannot be parsed.
    fn search_url(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: usize,
    ) -> Result<String, FetchError> {
        let base = format!("{}/search_bff/v2/content", self.base_url);
        let mut url = reqwest::Url::parse(&base).map_err(|e| FetchError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("page", &page.to_string());
            pairs.append_pair("status", "active");
            for location in &filters.locations {
                pairs.append_pair("location", location);
            }
            if let Some(category) = &filters.category {
                pairs.append_pair("category", category);
            }
            if let Some(sort) = filters.sort_order {
                pairs.append_pair("sort", sort.as_api_param());
            }
        }

        Ok(url.to_string())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
