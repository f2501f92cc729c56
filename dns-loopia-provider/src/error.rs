use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Unified error type for all remote calls made against the DNS provider.
///
/// Each variant includes a `provider` field identifying which provider produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Error Families
///
/// Variants fall into two families:
/// - **Transport** — the call never produced a usable answer:
///   [`NetworkError`](Self::NetworkError), [`Timeout`](Self::Timeout),
///   [`ParseError`](Self::ParseError), [`SerializationError`](Self::SerializationError)
///   and [`Fault`](Self::Fault).
/// - **Provider-reported** — the API answered with a status other than `"OK"`:
///   [`InvalidCredentials`](Self::InvalidCredentials), [`RateLimited`](Self::RateLimited),
///   [`InvalidParameter`](Self::InvalidParameter) and [`Unknown`](Self::Unknown).
///   [`raw_status()`](Self::raw_status) returns the exact status text.
///
/// The built-in HTTP transport retries `NetworkError`, `Timeout` and HTTP 429 with
/// exponential backoff. Provider-reported failures are never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// Failed to parse the provider's response (malformed XML-RPC or unexpected shape).
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize request arguments.
    SerializationError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// The XML-RPC endpoint answered with a `<fault>` instead of a result.
    Fault {
        /// Provider that produced the error.
        provider: String,
        /// `faultCode` member of the fault struct.
        fault_code: i64,
        /// `faultString` member of the fault struct.
        fault_string: String,
    },

    /// The provided credentials are invalid (`AUTH_ERROR`).
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original status text from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The API rate limit has been exceeded (`RATE_LIMITED`).
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original status text from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The provider rejected the call arguments (`BAD_INDATA`).
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Remote method whose arguments were rejected.
        param: String,
        /// Original status text from the provider API.
        detail: String,
    },

    /// Any other non-`"OK"` status from the provider API (e.g. `UNKNOWN_ERROR`).
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw status code, if the API separates code and message.
        raw_code: Option<String>,
        /// Raw status text from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（凭证错误、参数错误等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. } | Self::InvalidParameter { .. }
        )
    }

    /// The exact status text the provider answered with, for provider-reported failures.
    #[must_use]
    pub fn raw_status(&self) -> Option<&str> {
        match self {
            Self::InvalidCredentials { raw_message, .. } | Self::RateLimited { raw_message, .. } => {
                raw_message.as_deref()
            }
            Self::InvalidParameter { detail, .. } => Some(detail),
            Self::Unknown { raw_message, .. } => Some(raw_message),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { provider, detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::Fault {
                provider,
                fault_code,
                fault_string,
            } => {
                write!(f, "[{provider}] XML-RPC fault {fault_code}: {fault_string}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::Unknown {
                provider,
                raw_message,
                ..
            } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failure to map a validation hostname onto a zone registered with the provider.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// None of the suffix guesses is a registered zone.
    #[error("Unable to determine base domain for {hostname} using names: [{}]", .guesses.join(", "))]
    NoMatchingZone {
        /// Hostname that was being resolved.
        hostname: String,
        /// Guesses tried, most specific first.
        guesses: Vec<String>,
    },

    /// The matched zone is not a proper dot-separated suffix of the hostname.
    #[error("Base domain {base_domain} is not a proper suffix of {hostname}")]
    NotASuffix {
        /// Hostname that was being resolved.
        hostname: String,
        /// Zone that failed the suffix check.
        base_domain: String,
    },

    /// Listing the registered zones failed.
    #[error(transparent)]
    Lookup(#[from] ProviderError),
}

/// User-visible error raised by the challenge entry points.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The owning zone of the validation hostname could not be determined.
    #[error("Error finding base domain: {0}")]
    BaseDomain(#[source] ResolutionError),

    /// The provider refused or failed to create the TXT record.
    #[error("Error adding TXT record: {0}")]
    AddRecord(#[source] ProviderError),

    /// The API client could not be created.
    #[error("Error creating API client: {0}")]
    Client(#[source] ProviderError),

    /// No provider is registered under the requested name.
    #[error("Unknown DNS provider: {0}")]
    UnknownProvider(String),

    /// Credentials or settings could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            provider: "loopia".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[loopia] Network error: connection refused");
    }

    #[test]
    fn display_fault() {
        let e = ProviderError::Fault {
            provider: "loopia".to_string(),
            fault_code: 623,
            fault_string: "Method not found".to_string(),
        };
        assert_eq!(e.to_string(), "[loopia] XML-RPC fault 623: Method not found");
    }

    #[test]
    fn display_invalid_credentials_with_message() {
        let e = ProviderError::InvalidCredentials {
            provider: "loopia".to_string(),
            raw_message: Some("AUTH_ERROR".to_string()),
        };
        assert_eq!(e.to_string(), "[loopia] Invalid credentials: AUTH_ERROR");
    }

    #[test]
    fn display_invalid_parameter() {
        let e = ProviderError::InvalidParameter {
            provider: "loopia".to_string(),
            param: "addZoneRecord".to_string(),
            detail: "BAD_INDATA".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "[loopia] Invalid parameter 'addZoneRecord': BAD_INDATA"
        );
    }

    #[test]
    fn display_unknown() {
        let e = ProviderError::Unknown {
            provider: "loopia".to_string(),
            raw_code: Some("UNKNOWN_ERROR".to_string()),
            raw_message: "UNKNOWN_ERROR".to_string(),
        };
        assert_eq!(e.to_string(), "[loopia] UNKNOWN_ERROR");
    }

    #[test]
    fn raw_status_only_for_provider_reported() {
        let reported = ProviderError::Unknown {
            provider: "loopia".into(),
            raw_code: None,
            raw_message: "DOMAIN_OCCUPIED".into(),
        };
        assert_eq!(reported.raw_status(), Some("DOMAIN_OCCUPIED"));

        let transport = ProviderError::Timeout {
            provider: "loopia".into(),
            detail: "30s".into(),
        };
        assert_eq!(transport.raw_status(), None);
    }

    #[test]
    fn expected_errors_are_user_side() {
        assert!(ProviderError::InvalidCredentials {
            provider: "loopia".into(),
            raw_message: Some("AUTH_ERROR".into()),
        }
        .is_expected());
        assert!(ProviderError::InvalidParameter {
            provider: "loopia".into(),
            param: "addZoneRecord".into(),
            detail: "BAD_INDATA".into(),
        }
        .is_expected());
        assert!(!ProviderError::Unknown {
            provider: "loopia".into(),
            raw_code: None,
            raw_message: "UNKNOWN_ERROR".into(),
        }
        .is_expected());
        assert!(!ProviderError::NetworkError {
            provider: "loopia".into(),
            detail: "connection refused".into(),
        }
        .is_expected());
    }

    #[test]
    fn serialize_json_tagged() {
        let e = ProviderError::RateLimited {
            provider: "loopia".to_string(),
            retry_after: Some(60),
            raw_message: Some("RATE_LIMITED".to_string()),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"RateLimited\""));
        assert!(json.contains("\"retry_after\":60"));
    }

    #[test]
    fn resolution_error_lists_guesses() {
        let e = ResolutionError::NoMatchingZone {
            hostname: "_acme-challenge.sub.example.com".to_string(),
            guesses: vec![
                "sub.example.com".to_string(),
                "example.com".to_string(),
                "com".to_string(),
            ],
        };
        assert_eq!(
            e.to_string(),
            "Unable to determine base domain for _acme-challenge.sub.example.com using names: [sub.example.com, example.com, com]"
        );
    }

    #[test]
    fn plugin_error_wraps_provider_status() {
        let e = PluginError::AddRecord(ProviderError::Unknown {
            provider: "loopia".into(),
            raw_code: None,
            raw_message: "UNKNOWN_ERROR".into(),
        });
        assert_eq!(e.to_string(), "Error adding TXT record: [loopia] UNKNOWN_ERROR");
    }
}
