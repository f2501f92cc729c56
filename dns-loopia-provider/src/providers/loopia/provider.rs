//! Loopia DnsAuthenticator 实现
//!
//! 添加路径：任何失败都向上返回（挑战记录缺失会直接导致签发失败）。
//! 清理路径：尽力而为，所有失败只记录日志，不影响证书签发。

use async_trait::async_trait;

use crate::error::PluginError;
use crate::resolver::ZoneResolver;
use crate::traits::DnsAuthenticator;
use crate::types::{FieldType, ProviderCredentialField, ProviderMetadata, ZoneRecord};

use super::{LoopiaClient, PROVIDER_ID};

/// Publishes and removes dns-01 challenge records through the Loopia API.
///
/// Holds no state besides the client; build one per validation attempt.
pub struct LoopiaAuthenticator {
    client: LoopiaClient,
}

impl LoopiaAuthenticator {
    /// Wrap a configured client.
    pub fn new(client: LoopiaClient) -> Self {
        Self { client }
    }

    /// The underlying API client.
    pub fn client(&self) -> &LoopiaClient {
        &self.client
    }

    /// Create a TXT record with `record_content` at `record_name`.
    ///
    /// `domain_name` is the certificate domain and is only used for logging;
    /// the owning zone is resolved from `record_name`.
    pub async fn add_txt_record(
        &self,
        domain_name: &str,
        record_name: &str,
        record_content: &str,
    ) -> Result<(), PluginError> {
        log::info!("Adding TXT record for {domain_name} at {record_name}");

        let zone = ZoneResolver::new(&self.client)
            .resolve(record_name)
            .await
            .map_err(|e| {
                log::debug!("Error finding base domain: {e}");
                PluginError::BaseDomain(e)
            })?;

        let record = ZoneRecord::txt(record_content);
        self.client
            .add_zone_record(&zone.base_domain, &zone.subdomain, &record)
            .await
            .map_err(|e| {
                log::debug!("Error adding TXT record: {e}");
                PluginError::AddRecord(e)
            })?;

        log::debug!(
            "Successfully added TXT record at {} in zone {}",
            zone.subdomain,
            zone.base_domain
        );
        Ok(())
    }

    /// Remove the TXT record(s) at `record_name` whose content equals `record_content`.
    ///
    /// Never fails. Once the matching records are gone and nothing else lives
    /// at the subdomain, the subdomain entry is removed as well.
    pub async fn del_txt_record(&self, domain_name: &str, record_name: &str, record_content: &str) {
        log::info!("Removing TXT record for {domain_name} at {record_name}");

        let zone = match ZoneResolver::new(&self.client).resolve(record_name).await {
            Ok(zone) => zone,
            Err(e) => {
                log::debug!("Error finding base domain: {e}");
                return;
            }
        };
        let (domain, subdomain) = (zone.base_domain.as_str(), zone.subdomain.as_str());

        let records = match self.client.get_zone_records(domain, subdomain).await {
            Ok(records) => records,
            Err(e) => {
                log::debug!("Error getting DNS records: {e}");
                return;
            }
        };

        let mut removed = 0_usize;
        for record in records.iter().filter(|r| r.is_challenge(record_content)) {
            log::debug!("Removing TXT record {}", record.record_id);
            match self
                .client
                .remove_zone_record(domain, subdomain, record.record_id)
                .await
            {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Error deleting TXT record {}: {e}", record.record_id),
            }
        }
        log::debug!("Removed {removed} TXT record(s) at {subdomain} in zone {domain}");

        match self.client.get_zone_records(domain, subdomain).await {
            Ok(remaining) if remaining.is_empty() => {
                if let Err(e) = self.client.remove_subdomain(domain, subdomain).await {
                    log::debug!("Error cleaning up subdomain {subdomain}: {e}");
                } else {
                    log::debug!("Removed empty subdomain {subdomain} in zone {domain}");
                }
            }
            Ok(remaining) => {
                log::debug!(
                    "Keeping subdomain {subdomain}: {} record(s) remain",
                    remaining.len()
                );
            }
            Err(e) => log::debug!("Error cleaning up subdomain {subdomain}: {e}"),
        }
    }
}

#[async_trait]
impl DnsAuthenticator for LoopiaAuthenticator {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: PROVIDER_ID.to_string(),
            name: "Loopia".to_string(),
            description: "Obtain certificates using a DNS TXT record (if you are using Loopia for DNS)."
                .to_string(),
            required_fields: vec![
                ProviderCredentialField {
                    key: "username".to_string(),
                    label: "API Username".to_string(),
                    field_type: FieldType::Text,
                    help_text: Some("API username for Loopia account".to_string()),
                },
                ProviderCredentialField {
                    key: "password".to_string(),
                    label: "API Password".to_string(),
                    field_type: FieldType::Password,
                    help_text: Some("API password for Loopia account".to_string()),
                },
            ],
        }
    }

    async fn perform(
        &self,
        domain: &str,
        validation_name: &str,
        validation: &str,
    ) -> Result<(), PluginError> {
        self.add_txt_record(domain, validation_name, validation)
            .await
    }

    async fn cleanup(&self, domain: &str, validation_name: &str, validation: &str) {
        self.del_txt_record(domain, validation_name, validation)
            .await;
    }
}
