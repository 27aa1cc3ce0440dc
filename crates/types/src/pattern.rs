//! Build pattern registry
//!
//! A build pattern names the build system a package uses and selects the
//! `%build` / `%install` bodies of the emitted spec. Several sources hint at a
//! pattern (the URL, files found in the archive, an explicit recipe); each hint
//! is weighed as `tier + strength(pattern)` and only a strictly stronger hint
//! replaces the current one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of recognized build patterns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildPattern {
    #[default]
    #[serde(rename = "make")]
    Make,
    #[serde(rename = "configure_ac")]
    ConfigureAc,
    #[serde(rename = "autogen")]
    Autogen,
    #[serde(rename = "cmake")]
    Cmake,
    #[serde(rename = "qmake")]
    Qmake,
    #[serde(rename = "distutils3")]
    Distutils3,
    #[serde(rename = "cpan")]
    Cpan,
    #[serde(rename = "phpize")]
    Phpize,
    #[serde(rename = "R")]
    R,
    #[serde(rename = "ruby")]
    Ruby,
    #[serde(rename = "scons")]
    Scons,
    #[serde(rename = "meson")]
    Meson,
}

impl BuildPattern {
    pub const ALL: [Self; 12] = [
        Self::Make,
        Self::ConfigureAc,
        Self::Autogen,
        Self::Cmake,
        Self::Qmake,
        Self::Distutils3,
        Self::Cpan,
        Self::Phpize,
        Self::R,
        Self::Ruby,
        Self::Scons,
        Self::Meson,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Make => "make",
            Self::ConfigureAc => "configure_ac",
            Self::Autogen => "autogen",
            Self::Cmake => "cmake",
            Self::Qmake => "qmake",
            Self::Distutils3 => "distutils3",
            Self::Cpan => "cpan",
            Self::Phpize => "phpize",
            Self::R => "R",
            Self::Ruby => "ruby",
            Self::Scons => "scons",
            Self::Meson => "meson",
        }
    }

    /// Fixed tie-breaking strength of this pattern within one evidence tier.
    ///
    /// Ecosystem-specific patterns outrank generic ones so that, say, an R
    /// package shipping a `configure` script stays an R package.
    #[must_use]
    pub fn strength(self) -> u32 {
        match self {
            Self::Make => 0,
            Self::ConfigureAc => 2,
            Self::Autogen | Self::Scons | Self::Qmake => 3,
            Self::Cmake => 4,
            Self::Meson => 5,
            Self::Distutils3 | Self::Ruby => 6,
            Self::Cpan | Self::Phpize => 7,
            Self::R => 8,
        }
    }
}

impl fmt::Display for BuildPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPattern(pub String);

impl fmt::Display for UnknownPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown build pattern: {}", self.0)
    }
}

impl std::error::Error for UnknownPattern {}

impl FromStr for BuildPattern {
    type Err = UnknownPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPattern(s.to_string()))
    }
}

/// Whether `name` is a recognized build pattern
#[must_use]
pub fn contains(name: &str) -> bool {
    name.parse::<BuildPattern>().is_ok()
}

/// Fixed strength of a recognized pattern, `None` for unknown names
#[must_use]
pub fn strength(name: &str) -> Option<u32> {
    name.parse::<BuildPattern>().ok().map(BuildPattern::strength)
}

/// Where a pattern hint came from, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EvidenceTier {
    UrlHint,
    FileHeuristic,
    Recipe,
}

impl EvidenceTier {
    fn base(self) -> u32 {
        match self {
            Self::UrlHint => 10,
            Self::FileHeuristic => 20,
            Self::Recipe => 30,
        }
    }

    /// Strength to pass to `set_pattern` for a hint of `pattern` from this tier
    #[must_use]
    pub fn weigh(self, pattern: BuildPattern) -> u32 {
        self.base() + pattern.strength()
    }
}
