use std::sync::Arc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

use crate::ai::client::{
    CompletionClient, CompletionRequest, OpenAiClient, SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE,
};
use crate::ai::prompt_builder::{build_prompt, fallback_context};
use crate::core::config::{AppConfig, RetryPolicy};
use crate::core::models::{OrganizationQuery, SummaryOutcome};
use crate::errors::ResearchError;
use crate::research::search::{SearchAggregator, SearchRateLimiter};

pub const MISSING_NAME_ERROR: &str = "No organization name provided";

/// Researches an organization on the web and asks the completion service for
/// a one-paragraph summary.
pub struct SummaryGenerator {
    pipeline: Arc<Pipeline>,
    retry: RetryPolicy,
}

struct Pipeline {
    search: SearchAggregator,
    completion: Arc<dyn CompletionClient>,
    model: String,
}

impl SummaryGenerator {
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ResearchError> {
        let search = SearchAggregator::new(config)?;
        let completion = Arc::new(OpenAiClient::new(config)?);
        Ok(Self::from_parts(config, search, completion))
    }

    #[must_use]
    pub fn from_parts(
        config: &AppConfig,
        search: SearchAggregator,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                search,
                completion,
                model: config.openai_model.clone(),
            }),
            retry: config.retry.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be constructed.
    pub fn with_rate_limiter(
        config: &AppConfig,
        limiter: Arc<SearchRateLimiter>,
    ) -> Result<Self, ResearchError> {
        let search = SearchAggregator::new(config)?.with_rate_limiter(limiter);
        let completion = Arc::new(OpenAiClient::new(config)?);
        Ok(Self::from_parts(config, search, completion))
    }

    /// Produce a summary outcome for `raw_name`. Never fails; every error is
    /// folded into an unsuccessful outcome with a readable message.
    pub async fn summarize(&self, raw_name: &str) -> SummaryOutcome {
        let name = raw_name.trim();
        if name.is_empty() {
            warn!("Refusing to summarize an empty organization name");
            let error = ResearchError::InvalidInput(MISSING_NAME_ERROR.to_string());
            return SummaryOutcome::rejected(&error);
        }

        let min_delay = self.retry.min_delay;
        let min_ms = u64::try_from(min_delay.as_millis()).unwrap_or(u64::MAX);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor((min_ms / 2).max(1))
            .max_delay(self.retry.max_delay)
            .map(jitter)
            .map(move |delay| delay.max(min_delay))
            .take(self.retry.max_attempts.saturating_sub(1));

        // Each attempt runs as its own task so a panic deep in the pipeline
        // surfaces as a retryable error instead of tearing down the caller.
        let attempt = || {
            let pipeline = Arc::clone(&self.pipeline);
            let name = name.to_string();
            async move {
                tokio::spawn(async move { pipeline.run(&name).await })
                    .await
                    .map_err(ResearchError::from)
            }
        };

        match Retry::spawn(strategy, attempt).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Summary for {} failed after retries: {}", name, e);
                SummaryOutcome::failed(name, &e.to_string())
            }
        }
    }

    /// [`summarize`](Self::summarize) for callers holding an optional name.
    pub async fn summarize_opt(&self, raw_name: Option<&str>) -> SummaryOutcome {
        self.summarize(raw_name.unwrap_or_default()).await
    }
}

impl Pipeline {
    async fn run(&self, raw_name: &str) -> SummaryOutcome {
        let query = OrganizationQuery::new(raw_name);
        let display_name = if query.normalized.is_empty() {
            query.raw.as_str()
        } else {
            query.normalized.as_str()
        };

        match self.generate(display_name).await {
            Ok(summary) => SummaryOutcome::generated(&summary),
            Err(e) => {
                error!("Failed to generate summary for {}: {}", query.raw, e);
                SummaryOutcome::failed(&query.raw, &e.to_string())
            }
        }
    }

    async fn generate(&self, name: &str) -> Result<String, ResearchError> {
        let snippets = self.search.search(name).await;
        info!("Search for {} produced {} snippet(s)", name, snippets.len());

        let mut context = snippets.context();
        if context.trim().is_empty() {
            context = fallback_context(name);
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: build_prompt(name, &context),
            temperature: SUMMARY_TEMPERATURE,
            max_tokens: SUMMARY_MAX_TOKENS,
        };

        self.completion.complete(request).await
    }
}
