//! HTTP client wrapper with retry logic.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::KiteEnvelope;
use super::config::{KiteConfig, RetryConfig};
use super::error::KiteError;
use crate::application::ports::ExecutionContext;

/// HTTP client for Kite Connect with retry logic.
///
/// Holds the app API key only; the session token comes from the
/// [`ExecutionContext`] of each call.
#[derive(Debug, Clone)]
pub struct KiteHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry_config: RetryConfig,
}

impl KiteHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &KiteConfig) -> Result<Self, KiteError> {
        if config.api_key.trim().is_empty() {
            return Err(KiteError::AuthenticationFailed(
                "api_key is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| KiteError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            retry_config: config.retry.clone(),
        })
    }

    /// GET and unwrap the envelope's `data`. Retried on network errors,
    /// 5xx and 429.
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &ExecutionContext,
        path: &str,
    ) -> Result<T, KiteError> {
        self.request(ctx, Method::GET, path, None::<&()>).await
    }

    /// Form-encoded POST. Only retried on 429, never on network errors or
    /// 5xx, so an order is not submitted twice.
    #[allow(clippy::future_not_send)]
    pub async fn post_form<T: DeserializeOwned, F: Serialize>(
        &self,
        ctx: &ExecutionContext,
        path: &str,
        form: &F,
    ) -> Result<T, KiteError> {
        self.request(ctx, Method::POST, path, Some(form)).await
    }

    #[allow(clippy::future_not_send)]
    async fn request<T: DeserializeOwned, F: Serialize>(
        &self,
        ctx: &ExecutionContext,
        method: Method,
        path: &str,
        form: Option<&F>,
    ) -> Result<T, KiteError> {
        let url = format!("{}{path}", self.base_url);
        let idempotent = method == Method::GET;
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("X-Kite-Version", "3")
                .header(
                    "Authorization",
                    format!("token {}:{}", self.api_key, ctx.credential.access_token()),
                );
            if let Some(f) = form {
                request = request.form(f);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let retry = if idempotent {
                        backoff.next_backoff()
                    } else {
                        None
                    };
                    if let Some(delay) = retry {
                        tracing::warn!(
                            correlation_id = %ctx.correlation_id,
                            %path,
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if idempotent {
                        return Err(KiteError::MaxRetriesExceeded {
                            attempts: backoff.attempt,
                            last_error: e.to_string(),
                        });
                    }
                    return Err(KiteError::Network(e.to_string()));
                }
            };

            let status = response.status();
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let text = response
                .text()
                .await
                .map_err(|e| KiteError::Network(e.to_string()))?;

            if status.is_success() {
                return Self::unwrap_envelope(status, &text);
            }

            let (error_type, message) = match serde_json::from_str::<KiteEnvelope<serde_json::Value>>(&text) {
                Ok(env) => (
                    env.error_type,
                    env.message.unwrap_or_else(|| status.to_string()),
                ),
                Err(_) => (None, text),
            };

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = backoff
                        .next_backoff()
                        .map(|d| retry_after.map_or(d, Duration::from_secs));
                    if let Some(delay) = delay {
                        tracing::warn!(
                            correlation_id = %ctx.correlation_id,
                            %path,
                            delay_ms = delay.as_millis(),
                            "Rate limited, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(KiteError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(1),
                    });
                }
                ErrorCategory::Retryable if idempotent => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            correlation_id = %ctx.correlation_id,
                            %path,
                            status = status.as_u16(),
                            %message,
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(KiteError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                        last_error: message,
                    });
                }
                _ => {
                    if status == StatusCode::NOT_FOUND {
                        return Err(KiteError::OrderNotFound {
                            order_id: path.rsplit('/').next().unwrap_or(path).to_string(),
                        });
                    }
                    return Err(KiteError::from_api(status.as_u16(), error_type, message));
                }
            }
        }
    }

    fn unwrap_envelope<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, KiteError> {
        let envelope: KiteEnvelope<T> =
            serde_json::from_str(text).map_err(|e| KiteError::JsonParse(e.to_string()))?;

        if envelope.status != "success" {
            return Err(KiteError::from_api(
                status.as_u16(),
                envelope.error_type,
                envelope.message.unwrap_or_default(),
            ));
        }

        envelope
            .data
            .ok_or_else(|| KiteError::InvalidResponse("success envelope without data".to_string()))
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff with symmetric jitter.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
            jitter_factor: config.jitter_factor,
        }
    }

    /// Delay before the next attempt, or `None` once attempts are spent.
    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let base = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(self.apply_jitter(base))
    }

    fn apply_jitter(&self, base: Duration) -> Duration {
        let base_ms = base.as_secs_f64() * 1000.0;
        let range = base_ms * self.jitter_factor.clamp(0.0, 1.0);
        if range <= 0.0 {
            return base.min(self.max_backoff);
        }
        let jittered = rand::rng().random_range((base_ms - range)..=(base_ms + range));
        Duration::from_secs_f64(jittered.max(0.0) / 1000.0).min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(max_attempts: u32, jitter_factor: f64) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_factor,
        }
    }

    #[test]
    fn categorize_statuses() {
        assert!(matches!(
            categorize_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorCategory::RateLimited
        ));
        assert!(matches!(
            categorize_status(StatusCode::BAD_GATEWAY),
            ErrorCategory::Retryable
        ));
        assert!(matches!(
            categorize_status(StatusCode::BAD_REQUEST),
            ErrorCategory::NonRetryable
        ));
        assert!(matches!(
            categorize_status(StatusCode::FORBIDDEN),
            ErrorCategory::NonRetryable
        ));
    }

    #[test]
    fn backoff_without_jitter_doubles() {
        let mut backoff = ExponentialBackoff::new(&retry(4, 0.0));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(400)));
        assert!(backoff.next_backoff().is_none());
    }

    #[test]
    fn jitter_stays_in_band() {
        for _ in 0..50 {
            let mut backoff = ExponentialBackoff::new(&retry(3, 0.2));
            let delay = backoff.next_backoff().unwrap();
            assert!(delay >= Duration::from_millis(80), "{delay:?}");
            assert!(delay <= Duration::from_millis(120), "{delay:?}");
        }
    }

    #[test]
    fn envelope_without_success_is_error() {
        let text = r#"{"status":"error","message":"Markets are closed right now.","error_type":"InputException"}"#;
        let err = KiteHttpClient::unwrap_envelope::<serde_json::Value>(StatusCode::OK, text).unwrap_err();
        assert!(matches!(err, KiteError::MarketClosed(_)));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(KiteHttpClient::new(&KiteConfig::new("  ")).is_err());
    }
}
