//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dns_loopia_provider::xmlrpc::RpcTransport;
use dns_loopia_provider::{
    ApiCredentials, LoopiaAuthenticator, LoopiaClient, ProviderError, Result,
};
use serde_json::{Value, json};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

pub const USERNAME: &str = "user@loopiaapi";
pub const PASSWORD: &str = "secret";

/// 生成唯一的挑战 token
pub fn generate_test_token() -> String {
    format!("test-{}", uuid::Uuid::new_v4().simple())
}

/// 一次远程调用（不含凭证参数）
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Default)]
struct FakeState {
    domains: Vec<String>,
    records: BTreeMap<(String, String), Vec<Value>>,
    next_id: i64,
    failures: HashMap<String, Vec<Value>>,
    calls: Vec<RecordedCall>,
}

/// 内存中的 Loopia API（按 domain/subdomain 保存记录，自动分配 record_id）
#[derive(Debug, Clone, Default)]
pub struct FakeLoopia {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLoopia {
    pub fn with_domains(domains: &[&str]) -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.lock().unwrap();
            state.domains = domains.iter().map(ToString::to_string).collect();
            state.next_id = 1000;
        }
        fake
    }

    /// 预置一条记录，返回分配的 record_id
    pub fn seed(&self, domain: &str, subdomain: &str, record_type: &str, rdata: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state
            .records
            .entry((domain.to_string(), subdomain.to_string()))
            .or_default()
            .push(json!({
                "type": record_type,
                "ttl": 3600,
                "priority": 0,
                "rdata": rdata,
                "record_id": id,
            }));
        id
    }

    /// 让 `method` 的下一次调用返回给定的响应（可多次排队）
    pub fn fail_next(&self, method: &str, response: Value) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(method.to_string())
            .or_default()
            .push(response);
    }

    pub fn records(&self, domain: &str, subdomain: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&(domain.to_string(), subdomain.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// subdomain 条目是否仍存在（removeSubdomain 之前一直存在）
    pub fn has_subdomain(&self, domain: &str, subdomain: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .records
            .contains_key(&(domain.to_string(), subdomain.to_string()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.method).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn client(&self) -> LoopiaClient {
        LoopiaClient::with_transport(ApiCredentials::new(USERNAME, PASSWORD), Arc::new(self.clone()))
    }

    pub fn authenticator(&self) -> LoopiaAuthenticator {
        LoopiaAuthenticator::new(self.client())
    }
}

fn arg_str(args: &[Value], index: usize) -> String {
    args.get(index)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl RpcTransport for FakeLoopia {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let mut state = self.state.lock().unwrap();

        if params.len() < 2 || params[0] != USERNAME || params[1] != PASSWORD {
            return Ok(json!("AUTH_ERROR"));
        }
        let args = params[2..].to_vec();
        state.calls.push(RecordedCall {
            method: method.to_string(),
            args: args.clone(),
        });

        if let Some(queued) = state.failures.get_mut(method)
            && !queued.is_empty()
        {
            return Ok(queued.remove(0));
        }

        let key = (arg_str(&args, 0), arg_str(&args, 1));
        match method {
            "getDomains" => Ok(Value::Array(
                state
                    .domains
                    .iter()
                    .map(|d| json!({ "domain": d, "paid": 1, "registered": 1, "renewal_status": "NORMAL" }))
                    .collect(),
            )),
            "getZoneRecords" => Ok(Value::Array(
                state.records.get(&key).cloned().unwrap_or_default(),
            )),
            "addZoneRecord" => {
                let Some(record) = args.get(2).and_then(Value::as_object).cloned() else {
                    return Ok(json!("BAD_INDATA"));
                };
                state.next_id += 1;
                let mut stored = record;
                stored.insert("record_id".to_string(), json!(state.next_id));
                state
                    .records
                    .entry(key)
                    .or_default()
                    .push(Value::Object(stored));
                Ok(json!("OK"))
            }
            "removeZoneRecord" => {
                let id = args.get(2).and_then(Value::as_i64);
                let Some(records) = state.records.get_mut(&key) else {
                    return Ok(json!("UNKNOWN_ERROR"));
                };
                let before = records.len();
                records.retain(|r| r.get("record_id").and_then(Value::as_i64) != id);
                if records.len() == before {
                    return Ok(json!("UNKNOWN_ERROR"));
                }
                Ok(json!("OK"))
            }
            "removeSubdomain" => {
                state.records.remove(&key);
                Ok(json!("OK"))
            }
            other => Err(ProviderError::Fault {
                provider: "fake".to_string(),
                fault_code: 623,
                fault_string: format!("Method {other} not found"),
            }),
        }
    }
}

/// 真实 API 测试上下文
pub struct TestContext {
    pub authenticator: LoopiaAuthenticator,
    pub domain: String,
}

impl TestContext {
    /// 创建 Loopia 测试上下文
    pub fn loopia() -> Option<Self> {
        let username = env::var("LOOPIA_USERNAME").ok()?;
        let password = env::var("LOOPIA_PASSWORD").ok()?;
        let domain = env::var("TEST_DOMAIN").ok()?;

        let client = LoopiaClient::new(ApiCredentials::new(username, password)).ok()?;
        Some(Self {
            authenticator: LoopiaAuthenticator::new(client),
            domain,
        })
    }

    pub fn validation_name(&self) -> String {
        format!("_acme-challenge.{}", self.domain)
    }
}
