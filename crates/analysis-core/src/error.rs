use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No data available: {0}")]
    NoData(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request timed out: {0}")]
    TimeoutError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl AnalysisError {
    /// Transient failures are the only ones worth retrying: the market-data
    /// fetch retries these with backoff, everything else propagates at once.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AnalysisError::ConnectionError(_)
                | AnalysisError::TimeoutError(_)
                | AnalysisError::RateLimited(_)
        )
    }
}
