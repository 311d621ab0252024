//! Web research: name cleanup, search retrieval and page text extraction.

pub mod extract;
pub mod normalize;
pub mod search;

pub use extract::extract;
pub use normalize::normalize;
pub use search::{SearchAggregator, SearchRateLimiter, shared_rate_limiter};
