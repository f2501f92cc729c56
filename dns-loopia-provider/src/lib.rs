//! # dns-loopia-provider
//!
//! DNS-01 challenge authenticator for domains hosted at
//! [Loopia](https://www.loopia.com/), driven through the Loopia XML-RPC API.
//!
//! The crate has two halves:
//!
//! - **Zone resolution** ([`ZoneResolver`]): maps a validation hostname such as
//!   `_acme-challenge.sub.example.com` onto the zone registered under the
//!   account and the subdomain label relative to it.
//! - **Record management** ([`LoopiaAuthenticator`]): publishes the challenge
//!   TXT record and removes it again afterwards, including the subdomain entry
//!   once nothing else lives there.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_loopia_provider::{ApiCredentials, DnsAuthenticator, LoopiaAuthenticator, LoopiaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LoopiaClient::new(ApiCredentials::new("user@loopiaapi", "secret"))?;
//!     let authenticator = LoopiaAuthenticator::new(client);
//!
//!     authenticator
//!         .perform("example.com", "_acme-challenge.example.com", "token")
//!         .await?;
//!
//!     // ... let the CA validate ...
//!
//!     authenticator
//!         .cleanup("example.com", "_acme-challenge.example.com", "token")
//!         .await;
//!     Ok(())
//! }
//! ```
//!
//! Providers can also be created by name from a [`ConfigProvider`]:
//!
//! ```rust,no_run
//! use dns_loopia_provider::{FileConfig, create_authenticator};
//!
//! let config = FileConfig::load("/etc/letsencrypt/loopia.toml")?;
//! let authenticator = create_authenticator("loopia", &config)?;
//! # Ok::<(), dns_loopia_provider::PluginError>(())
//! ```
//!
//! ## Error Handling
//!
//! Remote calls return [`Result<T, ProviderError>`](ProviderError). A status
//! other than `"OK"` from the API is never treated as success:
//!
//! - [`ProviderError::InvalidCredentials`] — `AUTH_ERROR`
//! - [`ProviderError::RateLimited`] — `RATE_LIMITED`
//! - [`ProviderError::InvalidParameter`] — `BAD_INDATA`
//! - [`ProviderError::Unknown`] — any other status, text kept verbatim
//!
//! [`DnsAuthenticator::perform`] wraps failures in [`PluginError`];
//! [`DnsAuthenticator::cleanup`] only logs them.

mod config;
mod error;
mod factory;
mod providers;
mod resolver;
mod traits;
mod types;
mod utils;
pub mod xmlrpc;

// Re-export error types
pub use error::{PluginError, ProviderError, ResolutionError, Result};

// Re-export configuration
pub use config::{
    ConfigError, ConfigProvider, ENV_ENDPOINT, ENV_PASSWORD, ENV_USERNAME, EnvConfig, FileConfig,
};

// Re-export factory functions
pub use factory::{create_authenticator, get_all_provider_metadata};

// Re-export public traits (internal traits are not exported)
pub use traits::{DnsAuthenticator, ZoneLister};

// Re-export zone resolution
pub use resolver::{ZoneResolver, base_domain_guesses, calculate_subdomain};

// Re-export types
pub use types::{
    ApiCredentials, FieldType, ProviderCredentialField, ProviderMetadata, RegisteredDomain,
    RemoteRecord, ResolvedZone, TXT_RECORD_TTL, TXT_RECORD_TYPE, ZoneRecord,
};

// Re-export the concrete provider
pub use providers::{
    LOOPIA_API_ENDPOINT, LoopiaAuthenticator, LoopiaClient, LoopiaClientBuilder, PROVIDER_ID,
};
