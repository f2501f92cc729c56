//! Loopia 远程调用封装：凭证前置 + 统一状态检查

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::LoopiaClient;

/// 成功状态标记
const OK_STATUS: &str = "OK";

/// 归一化后的远程响应
///
/// Loopia 的返回值可能是裸状态字符串、单元素数组包装的状态字符串，
/// 或者结构化数据。这里只判定一次，业务代码不再关心响应形状。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RpcOutcome {
    /// 成功，携带原始返回值
    Ok(Value),
    /// 非 "OK" 的状态字符串
    ProviderFailure(String),
}

impl RpcOutcome {
    pub(crate) fn from_response(response: Value) -> Self {
        let status = match &response {
            Value::Array(items) => match items.as_slice() {
                [only] => only.as_str(),
                _ => None,
            },
            other => other.as_str(),
        };

        match status {
            Some(status) if status != OK_STATUS => Self::ProviderFailure(status.to_string()),
            _ => Self::Ok(response),
        }
    }
}

impl LoopiaClient {
    /// 调用远程方法（自动前置用户名/密码并检查状态）
    pub(crate) async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        let mut params = Vec::with_capacity(args.len() + 2);
        params.push(Value::String(self.credentials.username.clone()));
        params.push(Value::String(self.credentials.password.clone()));
        params.extend(args);

        let response = self.transport.call(method, &params).await?;

        match RpcOutcome::from_response(response) {
            RpcOutcome::Ok(value) => Ok(value),
            RpcOutcome::ProviderFailure(status) => {
                log::debug!("[{}] {method} returned {status}", self.provider_name());
                Err(self.map_error(
                    RawApiError::with_code(status.clone(), status),
                    ErrorContext::method(method),
                ))
            }
        }
    }

    /// 将返回值转换为目标类型
    pub(crate) fn decode<T: DeserializeOwned>(&self, method: &str, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| {
            log::error!("[{}] Unexpected {method} response: {e}", self.provider_name());
            self.parse_error(format!("{method}: {e}"))
        })
    }
}
