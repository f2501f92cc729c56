//! Provider 公共工具函数

use std::time::Duration;

use reqwest::Client;

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub fn create_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
}

// ============ 域名名称处理 ============

/// 去掉末尾的点并统一为小写
/// 如: "Example.COM." -> "example.com"
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
