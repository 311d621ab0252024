//! Web search retrieval for organization research.
//!
//! Issues a fixed, ordered set of queries against an HTML search provider,
//! pulls snippet text out of the result page, and stops as soon as enough
//! evidence has been gathered. When nothing usable comes back, result links
//! pointing at the trusted review site are fetched directly instead.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::config::{AppConfig, SearchPolicy};
use crate::core::models::{MIN_SNIPPET_CHARS, SearchSnippet, SnippetSet};
use crate::errors::ResearchError;
use crate::research::extract::{extract, flatten};

/// Snippets needed before the remaining queries are skipped.
pub const EARLY_STOP_SNIPPETS: usize = 2;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Result page selectors, highest signal first: result bodies, snippet
/// spans, descriptions, featured snippets, knowledge panel.
const RESULT_SELECTORS: [&str; 8] = [
    "div.VwiC3b",
    "div.IsZvec",
    "span.aCOpRe",
    "span.st",
    "div.s",
    "div.hgKElc",
    "div.kno-rdesc span",
    "div[data-attrid='description'] span",
];

pub type SearchRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token bucket shared by every aggregator that talks to the same provider.
#[must_use]
pub fn shared_rate_limiter(requests_per_minute: u32) -> Option<Arc<SearchRateLimiter>> {
    let rate = NonZeroU32::new(requests_per_minute)?;
    Some(Arc::new(RateLimiter::direct(Quota::per_minute(rate))))
}

pub struct SearchAggregator {
    client: Client,
    search_url: String,
    trusted_domain: String,
    policy: SearchPolicy,
    limiter: Option<Arc<SearchRateLimiter>>,
}

impl SearchAggregator {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ResearchError> {
        let client = Client::builder()
            .timeout(config.search.request_timeout)
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            trusted_domain: config.trusted_domain.trim().to_ascii_lowercase(),
            policy: config.search.clone(),
            limiter: config
                .search_requests_per_minute
                .and_then(shared_rate_limiter),
        })
    }

    /// Share a rate limiter with other aggregators instead of owning one.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<SearchRateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Queries in the order they are issued.
    #[must_use]
    pub fn queries(&self, name: &str) -> [String; 3] {
        [
            format!("\"{name}\""),
            format!("\"{name}\" site:{}", self.trusted_domain),
            format!("\"{name}\" mission statement"),
        ]
    }

    /// Gather snippets about an already-normalized organization name.
    ///
    /// Never fails: query errors are logged and skipped, so the worst case is
    /// an empty set.
    pub async fn search(&self, name: &str) -> SnippetSet {
        let mut snippets = SnippetSet::new();
        if name.trim().is_empty() {
            return snippets;
        }

        let queries = self.queries(name);
        let mut last_page: Option<String> = None;

        for (index, query) in queries.iter().enumerate() {
            match self.run_query(query).await {
                Ok(markup) => {
                    let kept = collect_snippets(&markup, query, &mut snippets);
                    info!("Query {} kept {} snippet(s)", query, kept);
                    last_page = Some(markup);
                }
                Err(e) => warn!("Abandoning query {}: {}", query, e),
            }

            if snippets.len() >= EARLY_STOP_SNIPPETS {
                debug!(
                    "Collected {} snippets, skipping {} remaining queries",
                    snippets.len(),
                    queries.len() - index - 1
                );
                return snippets;
            }

            if index + 1 < queries.len() {
                tokio::time::sleep(self.policy.query_pause).await;
            }
        }

        if snippets.is_empty()
            && let Some(markup) = last_page
        {
            return self.fallback(&markup).await;
        }

        snippets
    }

    /// One query, retried only while the provider keeps rate limiting us.
    async fn run_query(&self, query: &str) -> Result<String, ResearchError> {
        let base = self.policy.rate_limit_backoff;
        let strategy = (0..self.policy.rate_limit_retries).map(move |n| backoff(base, n));

        RetryIf::spawn(
            strategy,
            || self.fetch_results(query),
            ResearchError::is_rate_limited,
        )
        .await
    }

    async fn fetch_results(&self, query: &str) -> Result<String, ResearchError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Search provider rate limited query {}", query);
            return Err(ResearchError::RateLimited(query.to_string()));
        }
        if !status.is_success() {
            return Err(ResearchError::StatusError {
                status: status.as_u16(),
                url: self.search_url.clone(),
            });
        }

        Ok(response.text().await?)
    }

    /// Links in a result page that point at the trusted review site.
    #[must_use]
    pub fn trusted_links(&self, markup: &str) -> Vec<Url> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };
        let base = Url::parse(&self.search_url).ok();
        let document = Html::parse_document(markup);

        let mut links: Vec<Url> = Vec::new();
        for href in document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
        {
            let resolved = match &base {
                Some(base) => base.join(href).ok(),
                None => Url::parse(href).ok(),
            };
            let Some(url) = resolved.map(unwrap_redirect) else {
                continue;
            };
            if self.is_trusted(&url) && !links.contains(&url) {
                links.push(url);
            }
        }
        links
    }

    fn is_trusted(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        url.host_str()
            .map(str::to_ascii_lowercase)
            .is_some_and(|host| {
                host == self.trusted_domain || host.ends_with(&format!(".{}", self.trusted_domain))
            })
    }

    /// Fetch trusted-site pages linked from the last result page. The first
    /// page that loads decides the outcome.
    async fn fallback(&self, markup: &str) -> SnippetSet {
        let links = self.trusted_links(markup);
        if links.is_empty() {
            info!("No {} links to fall back on", self.trusted_domain);
            return SnippetSet::new();
        }

        for link in links {
            match self.fetch_page(&link).await {
                Ok(page) => {
                    let text = extract(&page);
                    let chars = text.chars().count();
                    if chars > MIN_SNIPPET_CHARS {
                        info!("Fallback page {} yielded {} chars", link, chars);
                        return SnippetSet::single(SearchSnippet::new(text, link.as_str()));
                    }
                    info!("Fallback page {} had no usable text", link);
                    return SnippetSet::new();
                }
                Err(e) => warn!("Fallback fetch of {} failed: {}", link, e),
            }
        }

        SnippetSet::new()
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, ResearchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::StatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Pull candidate snippets out of a result page; returns how many were kept.
pub fn collect_snippets(markup: &str, query: &str, snippets: &mut SnippetSet) -> usize {
    let document = Html::parse_document(markup);
    let mut kept = 0;

    for selector in RESULT_SELECTORS
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
    {
        for element in document.select(&selector) {
            let text = flatten(&element.text().collect::<String>());
            if snippets.push(SearchSnippet::new(text, query)) {
                kept += 1;
            }
        }
    }

    kept
}

/// `base × 2^attempt`
#[must_use]
pub fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Search engines wrap outbound links as `/url?q=<target>`.
fn unwrap_redirect(url: Url) -> Url {
    if url.path() != "/url" {
        return url;
    }
    url.query_pairs()
        .find(|(key, _)| key == "q" || key == "url")
        .and_then(|(_, target)| Url::parse(&target).ok())
        .unwrap_or(url)
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}
