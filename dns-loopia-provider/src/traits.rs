use async_trait::async_trait;

use crate::error::{PluginError, ProviderError, Result};
use crate::types::ProviderMetadata;

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（Loopia 只返回状态字符串，code 与 message 相同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 触发错误的远程方法名（用于 `InvalidParameter`）
    pub method: Option<String>,
}

impl ErrorContext {
    pub fn method(method: &str) -> Self {
        Self {
            method: Some(method.to_string()),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 将 API 返回的状态字符串映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Source of the zone names registered under an account.
///
/// The zone resolver only needs this one capability from a provider client,
/// which keeps it testable without a transport.
#[async_trait]
pub trait ZoneLister: Send + Sync {
    /// Names of every zone (base domain) registered under the account.
    async fn list_zone_names(&self) -> Result<Vec<String>>;
}

/// DNS-01 challenge authenticator.
///
/// The ACME client calls [`perform`](Self::perform) once to publish the
/// challenge token and [`cleanup`](Self::cleanup) once afterwards, whether
/// validation succeeded or not.
#[async_trait]
pub trait DnsAuthenticator: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 获取 Provider 元数据（类型级别）
    fn metadata() -> ProviderMetadata
    where
        Self: Sized;

    /// Publish `validation` as a TXT record at `validation_name`.
    ///
    /// Any failure here must abort issuance, so it is returned to the caller.
    async fn perform(
        &self,
        domain: &str,
        validation_name: &str,
        validation: &str,
    ) -> std::result::Result<(), PluginError>;

    /// Remove the TXT record published by [`perform`](Self::perform).
    ///
    /// Best effort: failures are logged and never returned.
    async fn cleanup(&self, domain: &str, validation_name: &str, validation: &str);
}
