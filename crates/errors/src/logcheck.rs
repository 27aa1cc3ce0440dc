//! Build log postmortem error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum LogCheckError {
    #[error("Blacklisted configure-miss is forbidden: {miss}")]
    BlacklistedMiss { miss: String },

    #[error("build log not found: {path}")]
    LogNotFound { path: String },

    #[error("failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("failed to write report {path}: {message}")]
    ReportWrite { path: String, message: String },
}

impl UserFacingError for LogCheckError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::BlacklistedMiss { .. } => Some(
                "Add the missing build requirement, or drop the entry from configure_blacklist.",
            ),
            Self::LogNotFound { .. } => Some("Run the build first so results/build.log exists."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::BlacklistedMiss { .. } => "logcheck.blacklisted_miss",
            Self::LogNotFound { .. } => "logcheck.log_not_found",
            Self::ReadFailed { .. } => "logcheck.read_failed",
            Self::ReportWrite { .. } => "logcheck.report_write",
        };
        Some(code)
    }
}
