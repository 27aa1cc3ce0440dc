#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for autospec
//!
//! This crate provides fine-grained error types organized by pipeline stage.
//! All error types implement Clone so they can travel through events.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod draft;
pub mod logcheck;
pub mod metadata;
pub mod network;
pub mod recipe;

// Re-export all error types at the root
pub use config::ConfigError;
pub use draft::DraftError;
pub use logcheck::LogCheckError;
pub use metadata::MetadataError;
pub use network::NetworkError;
pub use recipe::RecipeError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("recipe error: {0}")]
    Recipe(#[from] RecipeError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("{0}")]
    LogCheck(#[from] LogCheckError),

    #[error("draft error: {0}")]
    Draft(#[from] DraftError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Whether this error is a configure-miss policy violation
    #[must_use]
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::LogCheck(LogCheckError::BlacklistedMiss { .. }))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for autospec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Recipe(err) => err.user_message(),
            Error::Metadata(err) => err.user_message(),
            Error::LogCheck(err) => err.user_message(),
            Error::Draft(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            Error::Internal(_) => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Recipe(err) => err.user_hint(),
            Error::Metadata(err) => err.user_hint(),
            Error::LogCheck(err) => err.user_hint(),
            Error::Draft(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Metadata(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Recipe(err) => err.user_code(),
            Error::Metadata(err) => err.user_code(),
            Error::LogCheck(err) => err.user_code(),
            Error::Draft(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blacklisted_miss_renders_report_line() {
        let err: Error = LogCheckError::BlacklistedMiss {
            miss: "libbad".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Blacklisted configure-miss is forbidden: libbad"
        );
        assert!(err.is_policy_violation());
        assert_eq!(err.user_code(), Some("logcheck.blacklisted_miss"));
    }

    #[test]
    fn io_errors_keep_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io_with_path(&io, "/tmp/missing");
        match err {
            Error::Io { kind, path, .. } => {
                assert_eq!(kind, std::io::ErrorKind::NotFound);
                assert_eq!(path.as_deref(), Some(std::path::Path::new("/tmp/missing")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn network_timeouts_are_retryable() {
        let err: Error = NetworkError::Timeout {
            url: "https://example.com".to_string(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(!err.is_policy_violation());
    }
}
