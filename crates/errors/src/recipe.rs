//! Foreign recipe ingestion error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RecipeError {
    #[error("recipe not found: {path}")]
    NotFound { path: String },

    #[error("failed to read recipe {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("failed to append to phase file {path}: {message}")]
    PhaseFileWrite { path: String, message: String },
}

impl UserFacingError for RecipeError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Check the path passed with --recipe."),
            Self::ReadFailed { .. } => Some("Recipes must be readable UTF-8 text files."),
            Self::PhaseFileWrite { .. } => Some("Ensure the package directory is writable."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "recipe.not_found",
            Self::ReadFailed { .. } => "recipe.read_failed",
            Self::PhaseFileWrite { .. } => "recipe.phase_file_write",
        };
        Some(code)
    }
}
