//! Client error types
//!
//! Every failed request collapses into one error whose display text is
//! what the dashboard shows in its error banner.

use thiserror::Error;

/// Errors that can occur when talking to the dashboard API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never completed or the body could not be decoded
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL is not a usable HTTP URL
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status code, when the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidBaseUrl(_) => None,
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 404,
            body: r#"{"detail":"Not found"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"HTTP 404: {"detail":"Not found"}"#);
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_invalid_base_url_has_no_status() {
        let err = ApiError::InvalidBaseUrl("ftp://nowhere".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Invalid API base URL: ftp://nowhere");
    }
}
