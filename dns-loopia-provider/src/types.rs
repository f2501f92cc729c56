use serde::{Deserialize, Serialize};

// ============ Credential Types ============

/// Username/password pair for the Loopia API.
///
/// Supplied once when the client is built and never mutated afterwards.
/// `Debug` output redacts the password.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiCredentials {
    /// API username (e.g. `"user@loopiaapi"`).
    pub username: String,
    /// API password.
    pub password: String,
}

impl ApiCredentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

// ============ Record Types ============

/// Record type used for dns-01 challenges.
pub const TXT_RECORD_TYPE: &str = "TXT";
/// TTL (seconds) of every challenge record.
pub const TXT_RECORD_TTL: u32 = 30;

/// A record as sent to `addZoneRecord`.
///
/// The wire shape is fixed: `{type, ttl, rdata, priority}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Record content.
    pub rdata: String,
    /// Priority (only meaningful for MX/SRV, always 0 here).
    pub priority: u32,
}

impl ZoneRecord {
    /// Build the challenge record carrying `content`.
    pub fn txt(content: impl Into<String>) -> Self {
        Self {
            record_type: TXT_RECORD_TYPE.to_string(),
            ttl: TXT_RECORD_TTL,
            rdata: content.into(),
            priority: 0,
        }
    }
}

/// A record as returned by `getZoneRecords`.
///
/// Fields the provider adds beyond these are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Provider-assigned record identifier.
    pub record_id: i64,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content.
    pub rdata: String,
    /// Time to live in seconds, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Priority, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl RemoteRecord {
    /// Whether this is the TXT record carrying exactly `token`.
    pub fn is_challenge(&self, token: &str) -> bool {
        self.record_type == TXT_RECORD_TYPE && self.rdata == token
    }
}

// ============ Domain Types ============

/// A domain registered under the account, as returned by `getDomains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredDomain {
    /// Domain name (e.g. `"example.com"`).
    pub domain: String,
    /// Whether the domain is paid for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<i64>,
    /// Whether the domain is registered through the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<i64>,
    /// Renewal status (e.g. `"NORMAL"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_status: Option<String>,
    /// Expiration date as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

/// The zone owning a validation hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedZone {
    /// Registered zone (e.g. `"example.com"`).
    pub base_domain: String,
    /// Hostname relative to the zone (e.g. `"_acme-challenge.sub"`).
    pub subdomain: String,
}

// ============ Provider Metadata Types ============

/// The input type of a credential field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Plain text input.
    Text,
    /// Masked/password input.
    Password,
}

/// Definition of a single credential field required by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentialField {
    /// Machine-readable field key (e.g., `"username"`).
    pub key: String,
    /// Human-readable label (e.g., `"API Username"`).
    pub label: String,
    /// Input type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Optional help/description text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// Static metadata describing a DNS provider.
///
/// Obtain via [`DnsAuthenticator::metadata()`](crate::DnsAuthenticator::metadata) or
/// [`get_all_provider_metadata()`](crate::get_all_provider_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    /// Registry key of the provider.
    pub id: String,
    /// Human-readable provider name.
    pub name: String,
    /// Short description of the provider.
    pub description: String,
    /// Credential fields required to authenticate with this provider.
    pub required_fields: Vec<ProviderCredentialField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_record_has_fixed_shape() {
        let record = ZoneRecord::txt("abc123");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "TXT", "ttl": 30, "rdata": "abc123", "priority": 0})
        );
    }

    #[test]
    fn remote_record_ignores_extra_fields() {
        let record: RemoteRecord = serde_json::from_value(serde_json::json!({
            "type": "TXT",
            "ttl": 300,
            "priority": 0,
            "rdata": "abc123",
            "record_id": 42,
            "weight": 7
        }))
        .unwrap();
        assert_eq!(record.record_id, 42);
        assert!(record.is_challenge("abc123"));
    }

    #[test]
    fn is_challenge_requires_type_and_exact_content() {
        let record = RemoteRecord {
            record_id: 1,
            record_type: "A".to_string(),
            rdata: "abc123".to_string(),
            ttl: None,
            priority: None,
        };
        assert!(!record.is_challenge("abc123"));

        let record = RemoteRecord {
            record_type: "TXT".to_string(),
            ..record
        };
        assert!(!record.is_challenge("abc12"));
        assert!(!record.is_challenge("abc1234"));
        assert!(record.is_challenge("abc123"));
    }

    #[test]
    fn debug_redacts_password() {
        let creds = ApiCredentials::new("user@loopiaapi", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("user@loopiaapi"));
        assert!(!debug.contains("hunter2"));
    }
}
