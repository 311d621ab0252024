/// Funder Insight - web research and AI summaries for grant-making organizations.
///
/// For every funder returned by an upstream funder search, this crate looks the
/// organization up on the web, keeps the most useful result snippets, and asks a
/// chat completion model for a short factual paragraph about it.
///
/// # Architecture
///
/// The pipeline runs top-down:
/// - `research::normalize` cleans the organization name for searching
/// - `research::search` issues the ordered search queries, with rate-limit
///   backoff, snippet filtering and a trusted-site fallback
/// - `research::extract` turns fetched pages into plain text
/// - `features::summarize` builds the prompt and calls the completion service
/// - `features::enrich` fans out over a list of funder records
///
/// # Example
///
/// ```no_run
/// use funder_insight::core::config::AppConfig;
/// use funder_insight::features::SummaryGenerator;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     funder_insight::setup_logging();
///
///     let config = AppConfig::new("dummy_openai_key");
///     let generator = SummaryGenerator::new(&config)?;
///
///     let outcome = generator.summarize("The Kresge Foundation").await;
///     if outcome.success {
///         println!("{} ({})", outcome.summary, outcome.source);
///     } else {
///         println!("{}", outcome.summary);
///     }
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod core;
pub mod errors;
pub mod features;
pub mod research;

pub use ai::estimate_tokens;
pub use crate::core::models::{SearchSnippet, SnippetSet, SummaryOutcome};
pub use errors::ResearchError;
pub use features::SummaryGenerator;

/// Configure structured logging with JSON output.
///
/// Honors `RUST_LOG` and defaults to `info`. Calling it again after a global
/// subscriber is installed is a no-op.
///
/// # Example
///
/// ```
/// funder_insight::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
