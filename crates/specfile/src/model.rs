//! In-memory spec model
//!
//! One [`SpecModel`] is created per run and threaded through every stage.
//! Mutators are contract-checked: attempts to downgrade the build pattern,
//! duplicate licenses or empty summaries are silent no-ops and report
//! whether anything changed. [`SpecModel::freeze`] ends the mutable phase.

use crate::emit::FrozenSpec;
use crate::translate::Translations;
use autospec_types::{BuildPattern, Phase, SourceCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Score of a summary scraped from a metadata file in the archive
pub const ARCHIVE_SUMMARY_SCORE: u32 = 2;

/// Score of a summary reported by a package index
pub const REGISTRY_SUMMARY_SCORE: u32 = 4;

/// Extra archive unpacked next to the main tarball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDetail {
    pub url: String,
    pub sha256: String,
    /// Directory, relative to the build root, the archive unpacks into
    pub destination: String,
}

#[derive(Debug, Clone, Default)]
pub struct SpecModel {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) url: String,
    pub(crate) sha256: Option<String>,
    pub(crate) summary: String,
    summary_score: u32,
    pub(crate) licenses: Vec<String>,
    pub(crate) build_requirements: BTreeSet<String>,
    pub(crate) requires: BTreeSet<String>,
    pub(crate) locales: Vec<String>,
    pub(crate) sources: BTreeMap<SourceCategory, Vec<String>>,
    pub(crate) source_index: BTreeMap<String, u32>,
    pub(crate) archive_details: BTreeMap<String, ArchiveDetail>,
    pub(crate) commands: BTreeMap<Phase, Vec<String>>,
    pattern: (BuildPattern, u32),
    translations: Translations,
}

impl SpecModel {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Use `translations` for every subsequent `add_buildreq`
    #[must_use]
    pub fn with_translations(mut self, translations: Translations) -> Self {
        self.translations = translations;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn set_sha256(&mut self, sha256: impl Into<String>) {
        self.sha256 = Some(sha256.into());
    }

    /// Record a build pattern hint. Succeeds only when `strength` is strictly
    /// greater than the current strength, which starts at `make` / 0.
    pub fn set_pattern(&mut self, pattern: BuildPattern, strength: u32) -> bool {
        if strength <= self.pattern.1 {
            return false;
        }
        self.pattern = (pattern, strength);
        true
    }

    /// Insert a locale tag once, in first-insertion order
    pub fn add_locale(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.locales.iter().any(|l| l == tag) {
            return false;
        }
        self.sources.entry(SourceCategory::Locales).or_default();
        self.locales.push(tag.to_string());
        true
    }

    /// Append a license token unless an ASCII-case-insensitive match exists
    pub fn add_license(&mut self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty()
            || self
                .licenses
                .iter()
                .any(|l| l.eq_ignore_ascii_case(token))
        {
            return false;
        }
        self.licenses.push(token.to_string());
        true
    }

    /// Insert a build requirement after dictionary translation
    pub fn add_buildreq(&mut self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        let translated = self.translations.translate(token).to_string();
        self.build_requirements.insert(translated)
    }

    /// Insert a runtime requirement
    pub fn add_requires(&mut self, token: &str) -> bool {
        let token = token.trim();
        !token.is_empty() && self.requires.insert(token.to_string())
    }

    /// Replace the summary unless `text` is empty
    pub fn set_summary(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.summary = text.to_string();
        self.summary_score = u32::MAX;
        true
    }

    /// Replace the summary if `score` beats the score of the current one
    pub fn offer_summary(&mut self, text: &str, score: u32) -> bool {
        let text = text.trim();
        if text.is_empty() || score <= self.summary_score {
            return false;
        }
        self.summary = text.to_string();
        self.summary_score = score;
        true
    }

    /// Register a numbered source file and return its `SourceN` index.
    ///
    /// A file already registered keeps its index and category. The
    /// `locales` category never holds files and yields `None`.
    pub fn add_source(&mut self, category: SourceCategory, filename: &str) -> Option<u32> {
        if category == SourceCategory::Locales {
            return None;
        }
        if let Some(index) = self.source_index.get(filename) {
            return Some(*index);
        }
        let index = u32::try_from(self.source_index.len() + 1).ok()?;
        self.sources
            .entry(category)
            .or_default()
            .push(filename.to_string());
        self.source_index.insert(filename.to_string(), index);
        Some(index)
    }

    /// Register an extra archive as an `archive` source with its details
    pub fn add_archive(
        &mut self,
        filename: &str,
        url: &str,
        sha256: &str,
        destination: &str,
    ) -> Option<u32> {
        let index = self.add_source(SourceCategory::Archive, filename)?;
        self.archive_details.insert(
            filename.to_string(),
            ArchiveDetail {
                url: url.to_string(),
                sha256: sha256.to_string(),
                destination: destination.to_string(),
            },
        );
        Some(index)
    }

    /// Append snippet lines to a phase
    pub fn attach_command(&mut self, phase: Phase, lines: &[String]) {
        self.commands
            .entry(phase)
            .or_default()
            .extend(lines.iter().cloned());
    }

    /// End the mutable phase
    #[must_use]
    pub fn freeze(self) -> FrozenSpec {
        FrozenSpec::new(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Current build pattern; `make` until a stronger hint is recorded
    #[must_use]
    pub fn pattern(&self) -> BuildPattern {
        self.pattern.0
    }

    #[must_use]
    pub fn pattern_strength(&self) -> u32 {
        self.pattern.1
    }

    #[must_use]
    pub fn licenses(&self) -> &[String] {
        &self.licenses
    }

    #[must_use]
    pub fn build_requirements(&self) -> &BTreeSet<String> {
        &self.build_requirements
    }

    #[must_use]
    pub fn requires(&self) -> &BTreeSet<String> {
        &self.requires
    }

    #[must_use]
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    #[must_use]
    pub fn sources(&self, category: SourceCategory) -> &[String] {
        self.sources.get(&category).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has_source_category(&self, category: SourceCategory) -> bool {
        self.sources.contains_key(&category)
    }

    #[must_use]
    pub fn source_index(&self, filename: &str) -> Option<u32> {
        self.source_index.get(filename).copied()
    }

    #[must_use]
    pub fn archive_details(&self) -> &BTreeMap<String, ArchiveDetail> {
        &self.archive_details
    }

    #[must_use]
    pub fn commands(&self, phase: Phase) -> &[String] {
        self.commands.get(&phase).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_strength_hint_cannot_displace_make() {
        let mut model = SpecModel::default();
        assert_eq!(model.pattern(), BuildPattern::Make);
        assert_eq!(model.pattern_strength(), 0);
        assert!(!model.set_pattern(BuildPattern::Cmake, 0));
        assert_eq!(model.pattern(), BuildPattern::Make);
        assert!(model.set_pattern(BuildPattern::Cmake, 1));
        assert_eq!(model.pattern(), BuildPattern::Cmake);
        assert!(!model.set_pattern(BuildPattern::Meson, 1));
        assert_eq!(model.pattern_strength(), 1);
    }

    #[test]
    fn downgrade_is_a_no_op() {
        let mut model = SpecModel::default();
        model.set_pattern(BuildPattern::R, 18);
        assert!(!model.set_pattern(BuildPattern::ConfigureAc, 12));
        assert_eq!(model.pattern(), BuildPattern::R);
        assert_eq!(model.pattern_strength(), 18);
    }

    #[test]
    fn locales_are_idempotent_and_ordered() {
        let mut model = SpecModel::default();
        assert!(!model.has_source_category(SourceCategory::Locales));
        assert!(model.add_locale("gnome-foo"));
        assert!(model.add_locale("foo"));
        assert!(!model.add_locale("gnome-foo"));
        assert_eq!(model.locales(), ["gnome-foo", "foo"]);
        assert!(model.has_source_category(SourceCategory::Locales));
        assert!(model.sources(SourceCategory::Locales).is_empty());
    }

    #[test]
    fn buildreqs_pass_through_dictionary() {
        let mut model = SpecModel::default()
            .with_translations(Translations::parse("six=pypi-six\n"));
        model.add_buildreq("six");
        model.add_buildreq("zlib");
        let reqs: Vec<_> = model.build_requirements().iter().cloned().collect();
        assert_eq!(reqs, ["pypi-six", "zlib"]);
    }

    #[test]
    fn summary_scores_and_overrides() {
        let mut model = SpecModel::default();
        assert!(model.offer_summary("from PKG-INFO", ARCHIVE_SUMMARY_SCORE));
        assert!(model.offer_summary("from the index", REGISTRY_SUMMARY_SCORE));
        assert!(!model.offer_summary("weaker", ARCHIVE_SUMMARY_SCORE));
        assert_eq!(model.summary(), "from the index");

        assert!(!model.set_summary("   "));
        assert!(model.set_summary("Fast XYZ"));
        assert!(!model.offer_summary("late index hit", REGISTRY_SUMMARY_SCORE));
        assert!(model.set_summary("Faster XYZ"));
        assert_eq!(model.summary(), "Faster XYZ");
    }

    #[test]
    fn sources_are_numbered_once() {
        let mut model = SpecModel::default();
        assert_eq!(model.add_source(SourceCategory::Unit, "foo.service"), Some(1));
        assert_eq!(
            model.add_archive("dep-1.0.tar.gz", "https://example.com/dep-1.0.tar.gz", "abc", "deps/dep"),
            Some(2)
        );
        assert_eq!(model.add_source(SourceCategory::Gcov, "foo.service"), Some(1));
        assert_eq!(model.add_source(SourceCategory::Locales, "x.po"), None);

        for (filename, _) in &model.source_index {
            let homes = SourceCategory::NUMBERED
                .iter()
                .filter(|c| model.sources(**c).contains(filename))
                .count();
            assert_eq!(homes, 1, "{filename} must live in exactly one category");
        }
        assert_eq!(model.archive_details()["dep-1.0.tar.gz"].destination, "deps/dep");
    }

    #[test]
    fn commands_accumulate_per_phase() {
        let mut model = SpecModel::default();
        model.attach_command(Phase::Configure, &["# a".to_string()]);
        model.attach_command(Phase::Configure, &["# b".to_string()]);
        assert_eq!(model.commands(Phase::Configure), ["# a", "# b"]);
        assert!(model.commands(Phase::InstallAppend).is_empty());
    }

    fn any_pattern() -> impl Strategy<Value = BuildPattern> {
        prop::sample::select(BuildPattern::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn strongest_write_wins(writes in prop::collection::vec((any_pattern(), 0u32..40), 1..20)) {
            let mut model = SpecModel::default();
            for (pattern, strength) in &writes {
                model.set_pattern(*pattern, *strength);
            }

            let max = writes.iter().map(|(_, s)| *s).max().unwrap();
            let expected = if max == 0 {
                BuildPattern::Make
            } else {
                writes.iter().find(|(_, s)| *s == max).unwrap().0
            };
            prop_assert_eq!(model.pattern(), expected);
            prop_assert_eq!(model.pattern_strength(), max);
        }

        #[test]
        fn licenses_unique_under_ascii_case(base in "[a-z][a-z0-9.-]{0,12}", flips in prop::collection::vec(any::<u64>(), 1..8)) {
            let mut model = SpecModel::default();
            for mask in flips {
                let variant: String = base
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if mask >> (i % 64) & 1 == 1 { c.to_ascii_uppercase() } else { c })
                    .collect();
                model.add_license(&variant);
            }
            prop_assert_eq!(model.licenses().len(), 1);
        }
    }
}
