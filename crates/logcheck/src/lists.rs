//! Configure-miss whitelist and blacklist files

use std::collections::BTreeSet;
use std::path::Path;

pub use autospec_config::constants::{
    CONFIGURE_BLACKLIST as BLACKLIST_FILE, CONFIGURE_WHITELIST as WHITELIST_FILE,
};

/// One entry per line; blank lines and `#` comments are skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissList(BTreeSet<String>);

impl MissList {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(ToString::to_string)
                .collect(),
        )
    }

    /// Load a list file; a missing or unreadable file is an empty list
    pub async fn load(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no configure-miss list");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn contains(&self, miss: &str) -> bool {
        self.0.contains(miss)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MissList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
