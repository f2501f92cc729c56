//! Provider registry: explicit mapping from provider name to constructor.

use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::error::PluginError;
use crate::providers::{LoopiaAuthenticator, LoopiaClient};
use crate::traits::DnsAuthenticator;
use crate::types::ProviderMetadata;

type Constructor = fn(&dyn ConfigProvider) -> Result<Arc<dyn DnsAuthenticator>, PluginError>;

struct RegistryEntry {
    names: &'static [&'static str],
    metadata: fn() -> ProviderMetadata,
    create: Constructor,
}

const REGISTRY: &[RegistryEntry] = &[RegistryEntry {
    names: &["loopia", "dns-loopia"],
    metadata: <LoopiaAuthenticator as DnsAuthenticator>::metadata,
    create: create_loopia,
}];

fn create_loopia(config: &dyn ConfigProvider) -> Result<Arc<dyn DnsAuthenticator>, PluginError> {
    let mut builder = LoopiaClient::builder(config.credentials()?);
    if let Some(endpoint) = config.endpoint() {
        builder = builder.endpoint(endpoint);
    }
    if let Some(retries) = config.max_retries() {
        builder = builder.max_retries(retries);
    }
    let client = builder.build().map_err(PluginError::Client)?;
    Ok(Arc::new(LoopiaAuthenticator::new(client)))
}

/// Creates the [`DnsAuthenticator`] registered under `name`.
///
/// # Examples
///
/// ```rust,no_run
/// use dns_loopia_provider::{EnvConfig, create_authenticator};
///
/// let authenticator = create_authenticator("loopia", &EnvConfig::from_env())?;
/// # Ok::<(), dns_loopia_provider::PluginError>(())
/// ```
pub fn create_authenticator(
    name: &str,
    config: &dyn ConfigProvider,
) -> Result<Arc<dyn DnsAuthenticator>, PluginError> {
    let entry = REGISTRY
        .iter()
        .find(|entry| entry.names.iter().any(|n| n.eq_ignore_ascii_case(name)))
        .ok_or_else(|| PluginError::UnknownProvider(name.to_string()))?;
    (entry.create)(config)
}

/// Returns metadata for every registered provider.
pub fn get_all_provider_metadata() -> Vec<ProviderMetadata> {
    REGISTRY.iter().map(|entry| (entry.metadata)()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, EnvConfig};
    use crate::types::ApiCredentials;

    struct Static;

    impl ConfigProvider for Static {
        fn credentials(&self) -> Result<ApiCredentials, ConfigError> {
            Ok(ApiCredentials::new("user@loopiaapi", "secret"))
        }
    }

    #[test]
    fn known_names_resolve() {
        for name in ["loopia", "dns-loopia", "Loopia"] {
            let authenticator = create_authenticator(name, &Static).unwrap();
            assert_eq!(authenticator.id(), "loopia");
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = create_authenticator("cloudflare", &Static).err().unwrap();
        assert!(matches!(err, PluginError::UnknownProvider(ref n) if n == "cloudflare"));
    }

    #[test]
    fn missing_credentials_are_configuration_errors() {
        let err = create_authenticator("loopia", &EnvConfig::from_lookup(|_| None))
            .err()
            .unwrap();
        assert!(matches!(err, PluginError::Configuration(_)));
    }

    #[test]
    fn metadata_lists_credential_fields() {
        let metadata = get_all_provider_metadata();
        assert_eq!(metadata.len(), 1);
        let keys: Vec<_> = metadata[0]
            .required_fields
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(keys, ["username", "password"]);
    }
}
