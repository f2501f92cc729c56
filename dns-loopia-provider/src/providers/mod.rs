//! DNS Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod loopia;

pub use loopia::{
    LOOPIA_API_ENDPOINT, LoopiaAuthenticator, LoopiaClient, LoopiaClientBuilder, PROVIDER_ID,
};
