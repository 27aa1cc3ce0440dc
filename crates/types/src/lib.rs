#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for autospec
//!
//! This crate provides the small closed vocabularies shared by every stage of
//! the pipeline: build patterns, source categories and command phases.

pub mod pattern;

pub use pattern::{BuildPattern, EvidenceTier};

use serde::{Deserialize, Serialize};

/// Color output preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}

/// Category a numbered source file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
    Unit,
    Gcov,
    Tmpfile,
    Archive,
    Locales,
}

impl SourceCategory {
    /// Categories that carry numbered source files, in emission order
    pub const NUMBERED: [Self; 4] = [Self::Unit, Self::Gcov, Self::Tmpfile, Self::Archive];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Gcov => "gcov",
            Self::Tmpfile => "tmpfile",
            Self::Archive => "archive",
            Self::Locales => "locales",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spec section a command snippet is destined for
///
/// The string form doubles as the name of the scratch file the snippets
/// accumulate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Configure,
    InstallPrepend,
    InstallAppend,
}

impl Phase {
    pub const ALL: [Self; 3] = [Self::Configure, Self::InstallPrepend, Self::InstallAppend];

    /// Scratch file name for this phase
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::InstallPrepend => "install_prepend",
            Self::InstallAppend => "install_append",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}
