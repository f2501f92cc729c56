//! Loopia DNS Provider

mod api;
mod error;
mod http;
mod provider;

use std::sync::Arc;

use crate::error::Result;
use crate::types::ApiCredentials;
use crate::xmlrpc::{DEFAULT_MAX_RETRIES, HttpTransport, RpcTransport};

pub use provider::LoopiaAuthenticator;

/// Loopia XML-RPC endpoint.
pub const LOOPIA_API_ENDPOINT: &str = "https://api.loopia.se/RPCSERV";
/// Registry key and log label of the provider.
pub const PROVIDER_ID: &str = "loopia";

/// Typed client for the Loopia XML-RPC API.
///
/// Every remote method is sent with the account credentials prepended and its
/// response status checked in one place.
///
/// # Construction
///
/// ```rust,no_run
/// use dns_loopia_provider::{ApiCredentials, LoopiaClient};
///
/// let client = LoopiaClient::new(ApiCredentials::new("user@loopiaapi", "secret"))?;
/// # Ok::<(), dns_loopia_provider::ProviderError>(())
/// ```
pub struct LoopiaClient {
    pub(crate) credentials: ApiCredentials,
    pub(crate) transport: Arc<dyn RpcTransport>,
}

/// Builder for [`LoopiaClient`] with configurable endpoint, retries and transport.
pub struct LoopiaClientBuilder {
    credentials: ApiCredentials,
    endpoint: String,
    max_retries: u32,
    transport: Option<Arc<dyn RpcTransport>>,
}

impl LoopiaClientBuilder {
    fn new(credentials: ApiCredentials) -> Self {
        Self {
            credentials,
            endpoint: LOOPIA_API_ENDPOINT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            transport: None,
        }
    }

    /// Override the XML-RPC endpoint (default: [`LOOPIA_API_ENDPOINT`]).
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Use a custom transport instead of HTTP; `endpoint` and `max_retries` are ignored.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn RpcTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the [`LoopiaClient`] instance.
    pub fn build(self) -> Result<LoopiaClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::builder(self.endpoint)
                    .provider_name(PROVIDER_ID)
                    .max_retries(self.max_retries)
                    .build()?,
            ),
        };
        Ok(LoopiaClient {
            credentials: self.credentials,
            transport,
        })
    }
}

impl LoopiaClient {
    /// Creates a client talking to the public Loopia endpoint with default settings.
    pub fn new(credentials: ApiCredentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    /// Creates a client on top of an existing transport.
    pub fn with_transport(credentials: ApiCredentials, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    /// Returns a builder for customizing the client configuration.
    pub fn builder(credentials: ApiCredentials) -> LoopiaClientBuilder {
        LoopiaClientBuilder::new(credentials)
    }
}
