use thiserror::Error;

/// Everything that can go wrong while answering a location query.
///
/// The `Display` output is exactly what the error banner shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Empty or blank location; never reaches the network.
    #[error("Please enter a location")]
    Validation,

    /// Upstream answered with a non-success status.
    #[error("Location not found")]
    NotFound,

    /// Network, DNS or timeout failure, message passed through as-is.
    #[error("{0}")]
    Transport(String),

    /// Success status but the body did not carry the expected fields.
    #[error("Unexpected response from weather service: {0}")]
    MalformedResponse(String),
}

impl QueryError {
    pub fn banner_text(&self) -> String {
        self.to_string()
    }
}

// The request URL carries the API key; keep it out of the banner.
impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError::Transport(err.without_url().to_string())
    }
}
