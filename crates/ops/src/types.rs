//! Operation requests and reports

use autospec_logcheck::LogReport;
use autospec_types::BuildPattern;
use serde::Serialize;
use std::path::PathBuf;

/// Extra archive unpacked next to the main tarball
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraArchive {
    pub url: String,
    /// Directory relative to the build root
    pub destination: String,
}

/// Inputs of one draft run
#[derive(Debug, Clone, Default)]
pub struct DraftRequest {
    /// Source archive URL
    pub url: String,
    /// Foreign recipes merged in order
    pub recipes: Vec<PathBuf>,
    /// Package directory; derived from the config and package name if unset
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub archives: Vec<ExtraArchive>,
    /// Allow the package index query (the config must allow it too)
    pub pypi: bool,
    /// Run the reverse-dependency query
    pub whatrequires: bool,
    /// Run the external build and check its log
    pub build: bool,
}

/// Result of the external build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    pub success: bool,
    pub log_path: PathBuf,
}

/// What a draft run produced
#[derive(Debug, Clone, Serialize)]
pub struct DraftReport {
    pub name: String,
    pub version: String,
    pub pattern: BuildPattern,
    pub package_dir: PathBuf,
    pub spec_path: PathBuf,
    pub options_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildOutcome>,
    /// Configure-miss report lines, when a build log was checked
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub misses: Vec<String>,
}

/// Result of whichever operation the CLI ran
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OperationResult {
    Draft(DraftReport),
    LogCheck(LogReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
