//! Error types and generation status for GenX.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How a generation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Completed normally
    Done,
    /// Response was truncated (max tokens reached)
    Truncated,
    /// Response was blocked (safety filter, etc.)
    Blocked,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Done => write!(f, "done"),
            Status::Truncated => write!(f, "truncated"),
            Status::Blocked => write!(f, "blocked"),
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_token_count: i64,
    /// Number of tokens from cached content
    pub cached_content_token_count: i64,
    /// Number of tokens generated
    pub generated_token_count: i64,
}

impl Usage {
    /// Create a new Usage with the given counts.
    pub fn with_counts(prompt: i64, cached: i64, generated: i64) -> Self {
        Self {
            prompt_token_count: prompt,
            cached_content_token_count: cached,
            generated_token_count: generated,
        }
    }

    /// Total tokens used (prompt + generated).
    pub fn total(&self) -> i64 {
        self.prompt_token_count + self.generated_token_count
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Usage(prompt={}, cached={}, generated={})",
            self.prompt_token_count, self.cached_content_token_count, self.generated_token_count
        )
    }
}

/// Error type for GenX operations.
#[derive(Error, Debug)]
pub enum GenxError {
    /// Transport failure before a response arrived
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// The backend answered but the payload is unusable
    #[error("generation error: {message}")]
    Generation { usage: Usage, message: String },

    /// The request was not answered in time
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Invalid request parameters
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GenxError {
    /// Get the usage statistics if available.
    pub fn usage(&self) -> Option<&Usage> {
        match self {
            GenxError::Generation { usage, .. } => Some(usage),
            _ => None,
        }
    }

    /// Whether the failure happened before the backend produced an answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, GenxError::Http(_) | GenxError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Done.to_string(), "done");
        assert_eq!(Status::Truncated.to_string(), "truncated");
        assert_eq!(Status::Blocked.to_string(), "blocked");
    }

    #[test]
    fn test_usage() {
        let usage = Usage::with_counts(100, 10, 50);
        assert_eq!(usage.total(), 150);
        assert_eq!(usage.cached_content_token_count, 10);
        assert!(usage.to_string().contains("cached=10"));
    }

    #[test]
    fn test_error_usage() {
        let err = GenxError::Generation {
            usage: Usage::with_counts(3, 0, 0),
            message: "no candidates".into(),
        };
        assert_eq!(err.usage().unwrap().prompt_token_count, 3);
        assert!(err.to_string().contains("no candidates"));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_timeout_is_transport() {
        let err = GenxError::Timeout(std::time::Duration::from_secs(2));
        assert!(err.is_transport());
        assert!(err.to_string().contains("2s"));
    }

    #[test]
    fn test_api_error_display() {
        let err = GenxError::Api {
            status: 429,
            message: "quota".into(),
        };
        assert_eq!(err.to_string(), "api error 429: quota");
    }
}
