use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Search provider rate limited the request: {0}")]
    RateLimited(String),

    #[error("Unexpected response status {status} from {url}")]
    StatusError { status: u16, url: String },

    #[error("Failed to access completion API: {0}")]
    CompletionError(String),

    #[error("Summary attempt aborted: {0}")]
    Aborted(String),
}

impl ResearchError {
    /// Rate-limit responses are the only search failures worth retrying.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ResearchError::RateLimited(_))
    }
}

impl From<reqwest::Error> for ResearchError {
    fn from(error: reqwest::Error) -> Self {
        ResearchError::HttpError(error.to_string())
    }
}

impl From<tokio::task::JoinError> for ResearchError {
    fn from(error: tokio::task::JoinError) -> Self {
        ResearchError::Aborted(error.to_string())
    }
}
