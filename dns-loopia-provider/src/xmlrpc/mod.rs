//! XML-RPC transport
//!
//! [`RpcTransport`] is the seam between the provider client and the wire:
//! the client only ever says "invoke this named procedure with these arguments".
//! [`HttpTransport`] is the production implementation; tests substitute an
//! in-memory fake.

mod codec;
mod transport;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use codec::{CodecError, MethodResponse, decode_method_response, encode_method_call};
pub use transport::{DEFAULT_MAX_RETRIES, HttpTransport, HttpTransportBuilder};

/// Generic remote-procedure-call capability.
///
/// Implementations send `method` with `params` and return the decoded return
/// value. Network failures, malformed responses and XML-RPC faults surface as
/// transport-level [`ProviderError`](crate::ProviderError) variants; status
/// strings inside a successful response are left for the caller to interpret.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Invoke `method` with positional `params`.
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value>;
}
