//! XML-RPC over HTTPS
//!
//! One `POST` per call. Transient failures (network errors, timeouts, HTTP 429,
//! 502-504) are retried here with exponential backoff; everything the API
//! itself answers is handed back untouched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::providers::common::create_http_client;
use crate::utils::log_sanitizer::truncate_for_log;

use super::RpcTransport;
use super::codec::{MethodResponse, decode_method_response, encode_method_call};

/// Default number of automatic retries for transient errors.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// XML-RPC transport over HTTP(S).
///
/// # Construction
///
/// ```rust,no_run
/// use dns_loopia_provider::xmlrpc::HttpTransport;
///
/// let transport = HttpTransport::builder("https://api.loopia.se/RPCSERV")
///     .provider_name("loopia")
///     .max_retries(3)
///     .build()?;
/// # Ok::<(), dns_loopia_provider::ProviderError>(())
/// ```
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    provider_name: String,
    max_retries: u32,
}

/// Builder for [`HttpTransport`].
pub struct HttpTransportBuilder {
    endpoint: String,
    provider_name: String,
    max_retries: u32,
}

impl HttpTransportBuilder {
    fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            provider_name: "xmlrpc".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Label used in errors and log lines (default: `"xmlrpc"`).
    #[must_use]
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HttpTransport> {
        let client = create_http_client().map_err(|e| ProviderError::NetworkError {
            provider: self.provider_name.clone(),
            detail: format!("Failed to create HTTP client: {e}"),
        })?;
        Ok(HttpTransport {
            client,
            endpoint: self.endpoint,
            provider_name: self.provider_name,
            max_retries: self.max_retries,
        })
    }
}

impl HttpTransport {
    /// Returns a builder targeting `endpoint`.
    pub fn builder(endpoint: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(endpoint.into())
    }

    /// Endpoint URL calls are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_once(&self, request: RequestBuilder, method: &str) -> Result<String> {
        let provider = self.provider_name.as_str();
        log::debug!("[{provider}] POST {} ({method})", self.endpoint);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[{provider}] Response Status: {status}");

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        match status {
            429 => {
                log::warn!("[{provider}] Rate limited (HTTP 429), retry_after={retry_after:?}");
                Err(ProviderError::RateLimited {
                    provider: provider.to_string(),
                    retry_after,
                    raw_message: Some(truncate_for_log(&body)),
                })
            }
            400.. => {
                log::warn!("[{provider}] Server error (HTTP {status})");
                Err(ProviderError::NetworkError {
                    provider: provider.to_string(),
                    detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
                })
            }
            _ => {
                log::debug!("[{provider}] Response Body: {}", truncate_for_log(&body));
                Ok(body)
            }
        }
    }

    async fn post_with_retry(&self, body: String, method: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            let request = self
                .client
                .post(&self.endpoint)
                .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
                .body(body.clone());

            match self.post_once(request, method).await {
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] {method} failed (attempt {}/{}), retrying in {:.1}s: {e}",
                        self.provider_name,
                        attempt + 1,
                        self.max_retries,
                        delay.as_secs_f32(),
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let body = encode_method_call(method, params);
        let response_text = self.post_with_retry(body, method).await?;

        match decode_method_response(&response_text) {
            Ok(MethodResponse::Success(value)) => Ok(value),
            Ok(MethodResponse::Fault { code, message }) => {
                log::error!("[{}] {method} fault {code}: {message}", self.provider_name);
                Err(ProviderError::Fault {
                    provider: self.provider_name.clone(),
                    fault_code: code,
                    fault_string: message,
                })
            }
            Err(e) => {
                log::error!("[{}] XML-RPC decode failed: {e}", self.provider_name);
                log::error!(
                    "[{}] Raw response: {}",
                    self.provider_name,
                    truncate_for_log(&response_text)
                );
                Err(ProviderError::ParseError {
                    provider: self.provider_name.clone(),
                    detail: e.to_string(),
                })
            }
        }
    }
}

/// Network errors, timeouts and throttling are worth another attempt;
/// anything the API decided is final.
fn is_retryable(error: &ProviderError) -> bool {
    match error {
        ProviderError::Timeout { .. } | ProviderError::RateLimited { .. } => true,
        ProviderError::NetworkError { detail, .. } => {
            !detail.starts_with("HTTP ") || is_gateway_error(detail)
        }
        _ => false,
    }
}

fn is_gateway_error(detail: &str) -> bool {
    ["HTTP 502", "HTTP 503", "HTTP 504"]
        .iter()
        .any(|prefix| detail.starts_with(prefix))
}

/// `Retry-After` (capped at 30s) wins over the backoff schedule.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10s.
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20);
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(10_000))
}
