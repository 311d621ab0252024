use std::env;
use std::time::Duration;

use crate::errors::ResearchError;

pub const DEFAULT_MODEL: &str = "gpt-4-0125-preview";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
pub const DEFAULT_TRUSTED_DOMAIN: &str = "guidestar.org";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_org_id: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub search_url: String,
    pub trusted_domain: String,
    pub summary_concurrency: usize,
    pub search_requests_per_minute: Option<u32>,
    pub search: SearchPolicy,
    pub retry: RetryPolicy,
}

/// Timing knobs for the search stage.
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    /// Per-request timeout for search queries and page fetches.
    pub request_timeout: Duration,
    /// First rate-limit delay; each further retry doubles it.
    pub rate_limit_backoff: Duration,
    pub rate_limit_retries: u32,
    /// Pause between consecutive queries.
    pub query_pause: Duration,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            rate_limit_backoff: Duration::from_secs(2),
            rate_limit_retries: 3,
            query_pause: Duration::from_secs(3),
        }
    }
}

/// Outer retry applied around a whole summary attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    /// Build a configuration with defaults for everything but the API key.
    #[must_use]
    pub fn new(openai_api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: openai_api_key.into(),
            openai_org_id: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            trusted_domain: DEFAULT_TRUSTED_DOMAIN.to_string(),
            summary_concurrency: 1,
            search_requests_per_minute: None,
            search: SearchPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// # Errors
    ///
    /// Returns `ResearchError::ConfigError` when `OPENAI_API_KEY` is missing or
    /// a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ResearchError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|e| ResearchError::ConfigError(format!("OPENAI_API_KEY: {e}")))?;

        let mut config = Self::new(api_key);
        config.openai_org_id = load_env_optional("OPENAI_ORG_ID");
        if let Some(model) = load_env_optional("OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(base_url) = load_env_optional("OPENAI_BASE_URL") {
            config.openai_base_url = base_url;
        }
        if let Some(search_url) = load_env_optional("SEARCH_URL") {
            config.search_url = search_url;
        }
        if let Some(domain) = load_env_optional("TRUSTED_REVIEW_DOMAIN") {
            config.trusted_domain = domain;
        }
        if let Some(concurrency) = parse_env::<usize>("SUMMARY_CONCURRENCY")? {
            config.summary_concurrency = concurrency.max(1);
        }
        config.search_requests_per_minute =
            parse_env::<u32>("SEARCH_REQUESTS_PER_MINUTE")?.filter(|rate| *rate > 0);

        Ok(config)
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ResearchError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ResearchError::ConfigError(format!("{key}: invalid value {value}")))
        })
        .transpose()
}
