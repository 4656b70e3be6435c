//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures reported by the document store and listing endpoints
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got an HTTP answer
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-success status other than a token conflict
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A write presented a concurrency token that is no longer current
    #[error("Concurrency conflict: {0}")]
    Conflict(String),

    /// The body could not be decoded into the expected shape
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// A URL could not be built from the configured organization URL
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Stale-token rejection; the only error a writer retries
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// 404 from the service, e.g. a document or collection never written
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_and_not_found() {
        assert!(ClientError::Conflict("stale".into()).is_conflict());
        assert!(!ClientError::api_error(409, "x").is_conflict());
        assert!(ClientError::api_error(404, "gone").is_not_found());
        assert!(!ClientError::api_error(403, "denied").is_not_found());
    }
}
