//! Credential and connection settings
//!
//! Two sources are supported: a TOML credentials file and environment
//! variables. Both implement [`ConfigProvider`], which is all the provider
//! registry needs.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::types::ApiCredentials;
use crate::utils::log_sanitizer::mask_secret;

/// Environment variable holding the API username.
pub const ENV_USERNAME: &str = "LOOPIA_USERNAME";
/// Environment variable holding the API password.
pub const ENV_PASSWORD: &str = "LOOPIA_PASSWORD";
/// Environment variable overriding the XML-RPC endpoint.
pub const ENV_ENDPOINT: &str = "LOOPIA_ENDPOINT";

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credentials file could not be read.
    #[error("Failed to read credentials file {path}: {source}")]
    Io {
        /// File that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The credentials file is not valid TOML or has wrongly typed keys.
    #[error("Failed to parse credentials: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required setting is absent or empty.
    #[error("Missing required setting: {0}")]
    MissingField(String),
}

/// Supplies the API credentials and optional connection settings.
pub trait ConfigProvider: Send + Sync {
    /// Username and password for the API.
    fn credentials(&self) -> Result<ApiCredentials, ConfigError>;

    /// Custom XML-RPC endpoint, if any.
    fn endpoint(&self) -> Option<&str> {
        None
    }

    /// Custom retry count for transient transport errors, if any.
    fn max_retries(&self) -> Option<u32> {
        None
    }
}

fn required(field: &str, value: Option<&String>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ConfigError::MissingField(field.to_string())),
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

// ============ File ============

/// Credentials file contents.
///
/// ```toml
/// username = "user@loopiaapi"
/// password = "secret"
/// # optional
/// endpoint = "https://api.loopia.se/RPCSERV"
/// max_retries = 3
/// ```
///
/// The certbot-style keys `dns_loopia_username` / `dns_loopia_password` are
/// accepted as well.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default, alias = "dns_loopia_username")]
    username: Option<String>,
    #[serde(default, alias = "dns_loopia_password")]
    password: Option<String>,
    #[serde(default, alias = "dns_loopia_endpoint")]
    endpoint: Option<String>,
    #[serde(default)]
    max_retries: Option<u32>,
}

impl FileConfig {
    /// Read and parse the credentials file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        warn_if_accessible_by_others(path);

        let config = Self::from_toml_str(&content)?;
        if let Some(username) = &config.username {
            log::debug!(
                "Loaded credentials for {} from {}",
                mask_secret(username),
                path.display()
            );
        }
        Ok(config)
    }

    /// Parse credentials from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl ConfigProvider for FileConfig {
    fn credentials(&self) -> Result<ApiCredentials, ConfigError> {
        Ok(ApiCredentials {
            username: required("username", self.username.as_ref())?,
            password: required("password", self.password.as_ref())?,
        })
    }

    fn endpoint(&self) -> Option<&str> {
        non_empty(self.endpoint.as_ref())
    }

    fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }
}

#[cfg(unix)]
fn warn_if_accessible_by_others(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = std::fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            log::warn!(
                "Unsafe permissions on credentials file {}: {mode:o} (expected 600)",
                path.display()
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_accessible_by_others(_path: &Path) {}

// ============ Environment ============

/// Credentials read from `LOOPIA_USERNAME`, `LOOPIA_PASSWORD` and `LOOPIA_ENDPOINT`.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    username: Option<String>,
    password: Option<String>,
    endpoint: Option<String>,
}

impl EnvConfig {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            username: lookup(ENV_USERNAME),
            password: lookup(ENV_PASSWORD),
            endpoint: lookup(ENV_ENDPOINT),
        }
    }
}

impl ConfigProvider for EnvConfig {
    fn credentials(&self) -> Result<ApiCredentials, ConfigError> {
        Ok(ApiCredentials {
            username: required(ENV_USERNAME, self.username.as_ref())?,
            password: required(ENV_PASSWORD, self.password.as_ref())?,
        })
    }

    fn endpoint(&self) -> Option<&str> {
        non_empty(self.endpoint.as_ref())
    }
}
