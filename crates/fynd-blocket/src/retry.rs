//! Retry with exponential back-off and jitter for the Blocket client.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// Retriable: network-level failures (timeout, connection reset),
/// HTTP 429, and 5xx responses. Everything else — 404, other 4xx,
/// malformed JSON, bad base URL — is returned immediately.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        FetchError::RateLimited { .. } => true,
        FetchError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        FetchError::Deserialize { .. }
        | FetchError::NotFound { .. }
        | FetchError::InvalidBaseUrl { .. }
        | FetchError::PaginationLimit { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// Delay before the n-th retry is `backoff_base_ms * 2^(n-1)` with
/// ±25% jitter, capped at 60s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Blocket transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_retriable() {
        assert!(is_retriable(&FetchError::RateLimited {
            retry_after_secs: 60
        }));
    }

    #[test]
    fn server_errors_are_retriable() {
        assert!(is_retriable(&FetchError::UnexpectedStatus {
            status: 503,
            url: "https://api.blocket.se/x".to_string(),
        }));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&FetchError::UnexpectedStatus {
            status: 403,
            url: "https://api.blocket.se/x".to_string(),
        }));
        assert!(!is_retriable(&FetchError::NotFound {
            url: "https://api.blocket.se/x".to_string(),
        }));
    }

    #[test]
    fn deserialize_errors_are_not_retriable() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!is_retriable(&FetchError::Deserialize {
            context: "search page".to_string(),
            source,
        }));
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let mut calls = 0u32;
        let result: Result<(), FetchError> = retry_with_backoff(2, 0, || {
            calls += 1;
            async move {
                Err(FetchError::RateLimited {
                    retry_after_secs: 0,
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 3, "expected 1 initial attempt + 2 retries");
    }

    #[tokio::test]
    async fn non_retriable_error_returns_immediately() {
        let mut calls = 0u32;
        let result: Result<(), FetchError> = retry_with_backoff(5, 0, || {
            calls += 1;
            async move {
                Err(FetchError::NotFound {
                    url: "https://api.blocket.se/x".to_string(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
