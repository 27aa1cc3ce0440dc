//! Archive handling and spec synthesis error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum DraftError {
    #[error("unsupported archive format: {path}")]
    UnsupportedArchiveFormat { path: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("unable to determine package name from {url}")]
    NoPackageName { url: String },

    #[error("template error: {message}")]
    TemplateFailed { message: String },

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("build driver failed: {message}")]
    BuildFailed { message: String },
}

impl UserFacingError for DraftError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoPackageName { .. } => Some("Pass --name to set the package name explicitly."),
            Self::UnsupportedArchiveFormat { .. } => {
                Some("Supported archives: .tar, .tar.gz, .tgz, .tar.xz, .txz, .tar.bz2, .tbz2, .zip.")
            }
            Self::WriteFailed { .. } => Some("Ensure the output directory is writable."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnsupportedArchiveFormat { .. } => "draft.unsupported_archive_format",
            Self::ExtractionFailed { .. } => "draft.extraction_failed",
            Self::NoPackageName { .. } => "draft.no_package_name",
            Self::TemplateFailed { .. } => "draft.template_failed",
            Self::WriteFailed { .. } => "draft.write_failed",
            Self::BuildFailed { .. } => "draft.build_failed",
        };
        Some(code)
    }
}
