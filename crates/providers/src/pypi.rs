//! Python package index metadata
//!
//! The canonical index name is found with `pip search`; the package is then
//! installed into a throwaway virtualenv and `pip show` is parsed.

use crate::runner::{ToolCommand, ToolRunner};
use autospec_config::MetadataConfig;
use autospec_errors::MetadataError;
use autospec_events::EventEmitter;
use serde::{Deserialize, Serialize};

/// Metadata reported by the package index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PypiMetadata {
    pub name: String,
    pub summary: String,
    pub requires: Vec<String>,
}

impl PypiMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.summary.is_empty() && self.requires.is_empty()
    }

    /// Serialize as a single JSON object
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the `key: value` output of `pip show`
    #[must_use]
    pub fn from_show_output(text: &str) -> Self {
        let mut found = Self::default();
        for line in text.lines() {
            if let Some(value) = line.strip_prefix("Name:") {
                found.name = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("Summary:") {
                found.summary = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("Requires:") {
                found.requires = value
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(|r| r.to_lowercase().replace('-', "_"))
                    .collect();
            }
        }
        found
    }
}

/// Package index provider
pub struct PypiProvider<'a, R: ToolRunner + ?Sized> {
    runner: &'a R,
    pip: String,
    virtualenv: String,
}

impl<'a, R: ToolRunner + ?Sized> PypiProvider<'a, R> {
    pub fn new(runner: &'a R, config: &MetadataConfig) -> Self {
        Self {
            runner,
            pip: config.pip.clone(),
            virtualenv: config.virtualenv.clone(),
        }
    }

    async fn found_in_index(&self, name: &str) -> bool {
        let search = ToolCommand::new(&self.pip).args(["search", name]);
        matches!(self.runner.run(&search).await, Ok(output) if output.success())
    }

    /// Canonical index name for `name`
    ///
    /// Tries the lowercase name, then the part after a `python-` prefix, and
    /// falls back to the lowercase name when the index knows neither.
    pub async fn resolve_name(&self, name: &str) -> String {
        let lower = name.to_lowercase();
        if self.found_in_index(&lower).await {
            return lower;
        }
        if let Some(stripped) = lower.strip_prefix("python-") {
            if self.found_in_index(stripped).await {
                return stripped.to_string();
            }
        }
        lower
    }

    async fn install_and_show(&self, name: &str) -> Result<PypiMetadata, MetadataError> {
        let env_dir = tempfile::tempdir().map_err(|e| MetadataError::EnvironmentFailed {
            message: e.to_string(),
        })?;
        let env_path = env_dir.path().display().to_string();
        let env_pip = env_dir.path().join("bin").join("pip").display().to_string();

        let create = ToolCommand::new(&self.virtualenv).arg(&env_path);
        self.runner.run(&create).await?.check(&create)?;

        let install = ToolCommand::new(&env_pip).args(["install", name]);
        self.runner.run(&install).await?.check(&install)?;

        let show = ToolCommand::new(&env_pip).args(["show", name]);
        let output = self.runner.run(&show).await?.check(&show)?;

        let mut metadata = PypiMetadata::from_show_output(&output.stdout);
        if metadata.name.is_empty() {
            metadata.name = name.to_string();
        }
        Ok(metadata)
    }

    /// Look up `name` in the package index.
    ///
    /// Any failure is reported as a warning and yields empty metadata.
    pub async fn query(&self, name: &str, tx: &impl EventEmitter) -> PypiMetadata {
        let resolved = self.resolve_name(name).await;
        tracing::debug!(name, resolved = %resolved, "resolved package index name");

        match self.install_and_show(&resolved).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tx.emit_warning_with_context(
                    format!("Unable to fetch package index metadata for {resolved}"),
                    e.to_string(),
                );
                PypiMetadata::default()
            }
        }
    }
}
