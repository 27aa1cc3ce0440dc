//! CLI error handling

use std::fmt;
use std::path::PathBuf;

use autospec_errors::{Error, UserFacingError};

/// Failure of one autospec invocation
#[derive(Debug)]
pub enum CliError {
    /// Drafting a spec for this archive URL failed
    Draft { url: String, source: Error },
    /// Checking the build log of this package directory failed
    LogCheck { pkg_dir: PathBuf, source: Error },
    /// Config loading or pipeline setup failed before any work started
    Setup(Error),
    /// The command line cannot describe a run
    Usage(String),
    Io(std::io::Error),
}

/// Message, code, hint and retry lines for a pipeline error
fn write_details(f: &mut fmt::Formatter<'_>, e: &Error) -> fmt::Result {
    write!(f, "{}", e.user_message())?;
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    if e.is_retryable() {
        write!(f, "\n  Retry: rerunning the same command may succeed.")?;
    }
    Ok(())
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Draft { url, source } => {
                write!(f, "cannot draft a spec from {url}: ")?;
                write_details(f, source)
            }
            CliError::LogCheck { pkg_dir, source } => {
                write!(f, "build log check in {} failed: ", pkg_dir.display())?;
                write_details(f, source)
            }
            CliError::Setup(source) => write_details(f, source),
            CliError::Usage(msg) => write!(f, "{msg} (see `autospec --help`)"),
            CliError::Io(e) => write!(f, "runtime setup failed: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Draft { source, .. }
            | CliError::LogCheck { source, .. }
            | CliError::Setup(source) => Some(source),
            CliError::Io(e) => Some(e),
            CliError::Usage(_) => None,
        }
    }
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        CliError::Setup(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autospec_errors::{LogCheckError, NetworkError};

    #[test]
    fn draft_failure_names_the_archive() {
        let err = CliError::Draft {
            url: "https://example.com/foo-1.0.tar.gz".to_string(),
            source: NetworkError::Fatal {
                url: "https://example.com/foo-1.0.tar.gz".to_string(),
                reason: "HTTP 404".to_string(),
            }
            .into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("cannot draft a spec from https://example.com/foo-1.0.tar.gz: "));
        assert!(text.contains("\n  Code: "));
    }

    #[test]
    fn logcheck_failure_names_the_package_dir() {
        let err = CliError::LogCheck {
            pkg_dir: PathBuf::from("/srv/pkgs/foo"),
            source: LogCheckError::BlacklistedMiss {
                miss: "libbad".to_string(),
            }
            .into(),
        };
        assert!(err
            .to_string()
            .starts_with("build log check in /srv/pkgs/foo failed: "));
    }

    #[test]
    fn usage_points_at_help() {
        let err = CliError::Usage("a source archive URL is required".to_string());
        assert_eq!(
            err.to_string(),
            "a source archive URL is required (see `autospec --help`)"
        );
    }
}
