//! Loopia 远程方法（每个方法对应一个 XML-RPC 过程）

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::traits::{ProviderErrorMapper, ZoneLister};
use crate::types::{RegisteredDomain, RemoteRecord, ZoneRecord};

use super::LoopiaClient;

impl LoopiaClient {
    /// `getDomains`: every domain registered under the account.
    pub async fn get_domains(&self) -> Result<Vec<RegisteredDomain>> {
        let value = self.call("getDomains", Vec::new()).await?;
        self.decode("getDomains", value)
    }

    /// `getZoneRecords`: records stored at `subdomain` of `domain`.
    pub async fn get_zone_records(
        &self,
        domain: &str,
        subdomain: &str,
    ) -> Result<Vec<RemoteRecord>> {
        let value = self
            .call("getZoneRecords", vec![domain.into(), subdomain.into()])
            .await?;
        self.decode("getZoneRecords", value)
    }

    /// `addZoneRecord`: create `record` at `subdomain` of `domain`.
    pub async fn add_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<()> {
        let record = serde_json::to_value(record).map_err(|e| ProviderError::SerializationError {
            provider: self.provider_name().to_string(),
            detail: e.to_string(),
        })?;
        self.call("addZoneRecord", vec![domain.into(), subdomain.into(), record])
            .await?;
        Ok(())
    }

    /// `removeZoneRecord`: delete one record by id.
    pub async fn remove_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_id: i64,
    ) -> Result<()> {
        self.call(
            "removeZoneRecord",
            vec![domain.into(), subdomain.into(), Value::from(record_id)],
        )
        .await?;
        Ok(())
    }

    /// `removeSubdomain`: delete the subdomain entry itself.
    pub async fn remove_subdomain(&self, domain: &str, subdomain: &str) -> Result<()> {
        self.call("removeSubdomain", vec![domain.into(), subdomain.into()])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ZoneLister for LoopiaClient {
    async fn list_zone_names(&self) -> Result<Vec<String>> {
        Ok(self
            .get_domains()
            .await?
            .into_iter()
            .map(|d| d.domain)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::types::ApiCredentials;
    use crate::xmlrpc::RpcTransport;

    /// 记录调用参数并返回预设响应
    struct Scripted {
        response: Value,
        calls: Mutex<Vec<(String, Vec<Value>)>>,
    }

    #[async_trait]
    impl RpcTransport for Scripted {
        async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params.to_vec()));
            Ok(self.response.clone())
        }
    }

    fn client(response: Value) -> (LoopiaClient, Arc<Scripted>) {
        let transport = Arc::new(Scripted {
            response,
            calls: Mutex::new(Vec::new()),
        });
        let client = LoopiaClient::with_transport(
            ApiCredentials::new("user@loopiaapi", "secret"),
            transport.clone(),
        );
        (client, transport)
    }

    #[tokio::test]
    async fn credentials_are_prepended() {
        let (client, transport) = client(json!("OK"));
        client
            .add_zone_record("example.com", "_acme-challenge", &ZoneRecord::txt("abc123"))
            .await
            .unwrap();

        let calls = transport.calls.lock().unwrap();
        let (method, params) = &calls[0];
        assert_eq!(method, "addZoneRecord");
        assert_eq!(
            params,
            &vec![
                json!("user@loopiaapi"),
                json!("secret"),
                json!("example.com"),
                json!("_acme-challenge"),
                json!({"type": "TXT", "ttl": 30, "rdata": "abc123", "priority": 0}),
            ]
        );
    }

    #[tokio::test]
    async fn record_id_is_sent_as_integer() {
        let (client, transport) = client(json!("OK"));
        client
            .remove_zone_record("example.com", "_acme-challenge", 4711)
            .await
            .unwrap();
        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1[4], json!(4711));
    }

    #[tokio::test]
    async fn status_failure_surfaces_exact_text() {
        let (client, _) = client(json!("UNKNOWN_ERROR"));
        let err = client
            .remove_subdomain("example.com", "_acme-challenge")
            .await
            .unwrap_err();
        assert_eq!(err.raw_status(), Some("UNKNOWN_ERROR"));
    }

    #[tokio::test]
    async fn zone_names_come_from_get_domains() {
        let (client, _) = client(json!([
            {"domain": "example.com", "paid": 1, "registered": 1, "renewal_status": "NORMAL"},
            {"domain": "other.se"}
        ]));
        assert_eq!(
            client.list_zone_names().await.unwrap(),
            vec!["example.com".to_string(), "other.se".to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_records_are_parse_errors() {
        let (client, _) = client(json!([{"unexpected": true}]));
        let err = client
            .get_zone_records("example.com", "_acme-challenge")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ParseError { .. }));
    }
}
