//! Loopia 错误映射

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{LoopiaClient, PROVIDER_ID};

/// Loopia 状态字符串映射
/// 参考: <https://www.loopia.com/api/>
impl ProviderErrorMapper for LoopiaClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER_ID
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // ============ 认证错误 ============
            Some("AUTH_ERROR") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // ============ 频率限流 ============
            Some("RATE_LIMITED") => ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },

            // ============ 参数无效 ============
            Some("BAD_INDATA") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: context.method.unwrap_or_default(),
                detail: raw.message,
            },

            // ============ 其他错误 fallback（UNKNOWN_ERROR、DOMAIN_OCCUPIED 等） ============
            _ => self.unknown_error(raw),
        }
    }
}
