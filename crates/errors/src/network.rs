//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("transfer from {url} stalled below {limit} bytes/s for {seconds} seconds")]
    LowSpeed { url: String, limit: u64, seconds: u64 },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("unable to download file {url}: {reason}")]
    Fatal { url: String, reason: String },
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::LowSpeed { .. } | Self::ConnectionRefused(_) => {
                Some("Check your network connection or mirror and retry.")
            }
            Self::InvalidUrl(_) => Some("Pass an absolute http(s) URL to the source archive."),
            Self::HttpError { status, .. } if *status == 404 => {
                Some("The server reports the archive does not exist; verify the URL.")
            }
            Self::WriteFailed { .. } => Some("Ensure the output directory is writable."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::LowSpeed { .. } | Self::ConnectionRefused(_)
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "network.timeout",
            Self::LowSpeed { .. } => "network.low_speed",
            Self::DownloadFailed(_) => "network.download_failed",
            Self::ConnectionRefused(_) => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::WriteFailed { .. } => "network.write_failed",
            Self::Fatal { .. } => "network.fatal",
        };
        Some(code)
    }
}
