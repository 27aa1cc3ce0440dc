//! Build requirement translation dictionary
//!
//! `translate.dic` maps upstream dependency names onto distribution package
//! names, one `from=to` pair per line.

use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Translations {
    map: HashMap<String, String>,
}

impl Translations {
    /// Parse dictionary text. Blank lines, `#` comments and lines without
    /// `=` are ignored; both sides are trimmed.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let map = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(from, to)| (from.trim().to_string(), to.trim().to_string()))
            .filter(|(from, to)| !from.is_empty() && !to.is_empty())
            .collect();
        Self { map }
    }

    /// Load a dictionary file; a missing or unreadable file gives an empty map
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no translation dictionary");
                Self::default()
            }
        }
    }

    /// Translated name, or the input when no entry exists
    #[must_use]
    pub fn translate<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map_or(name, String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
