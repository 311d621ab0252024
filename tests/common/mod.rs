#![allow(dead_code)]

use funder_insight::core::config::{AppConfig, RetryPolicy, SearchPolicy};
use httpmock::MockServer;
use std::time::Duration;

/// Config pointing every endpoint at the mock server, with delays shrunk to
/// milliseconds.
pub fn test_config(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::new("sk-test");
    config.openai_model = "gpt-test".to_string();
    config.openai_base_url = server.url("/v1");
    config.search_url = server.url("/search");
    config.trusted_domain = "127.0.0.1".to_string();
    config.search = SearchPolicy {
        request_timeout: Duration::from_secs(5),
        rate_limit_backoff: Duration::from_millis(1),
        rate_limit_retries: 3,
        query_pause: Duration::from_millis(1),
    };
    config.retry = RetryPolicy {
        max_attempts: 3,
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
    };
    config
}

pub fn result_page(snippets: &[&str]) -> String {
    let body: String = snippets
        .iter()
        .map(|text| format!(r#"<div class="g"><div class="VwiC3b">{text}</div></div>"#))
        .collect();
    format!("<html><body><div id=\"search\">{body}</div></body></html>")
}

pub const KRESGE_SNIPPETS: [&str; 2] = [
    "The Kresge Foundation expands opportunities in America's cities through grants.",
    "Kresge was founded in 1924 and is based in Troy, Michigan, with a national scope.",
];
