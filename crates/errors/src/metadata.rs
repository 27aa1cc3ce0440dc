//! Metadata provider error types
//!
//! Providers never abort the pipeline; callers downgrade these to warnings.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum MetadataError {
    #[error("failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("{command} exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("package {name} not found in the package index")]
    NotInIndex { name: String },

    #[error("environment setup failed: {message}")]
    EnvironmentFailed { message: String },

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
}

impl UserFacingError for MetadataError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SpawnFailed { .. } => {
                Some("Install the missing tool or point the [metadata] config at it.")
            }
            Self::NotInIndex { .. } => Some("Pass --name with the package's index name."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::SpawnFailed { .. } => "metadata.spawn_failed",
            Self::CommandFailed { .. } => "metadata.command_failed",
            Self::NotInIndex { .. } => "metadata.not_in_index",
            Self::EnvironmentFailed { .. } => "metadata.environment_failed",
            Self::WriteFailed { .. } => "metadata.write_failed",
        };
        Some(code)
    }
}
