//! Metadata scraped from well-known files in the source tree

use autospec_specfile::{SpecModel, ARCHIVE_SUMMARY_SCORE};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;

static PKG_INFO_SUMMARY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^Summary:[ \t]*(.+?)\s*$").ok());
static PKG_INFO_LICENSE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^License:[ \t]*(.+?)\s*$").ok());
static R_TITLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^Title:[ \t]*(.+?)\s*$").ok());
static META_ABSTRACT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?m)^abstract:[ \t]*['"]?(.+?)['"]?\s*$"#).ok()
});
static META_LICENSE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?m)^license:[ \t]*(\S.*?)?\s*$((?:\n\s+-\s*.+)*)").ok()
});
static XML_SUMMARY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<summary>\s*(.+?)\s*</summary>").ok());
static XML_LICENSE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<license[^>]*>\s*(.+?)\s*</license>").ok());

/// What the source tree says about itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveMetadata {
    pub summary: Option<String>,
    pub licenses: Vec<String>,
    /// A `po/` directory with translations exists
    pub has_translations: bool,
}

impl ArchiveMetadata {
    /// Offer everything found to the spec model at archive priority
    pub fn apply(&self, model: &mut SpecModel) {
        if let Some(summary) = &self.summary {
            model.offer_summary(summary, ARCHIVE_SUMMARY_SCORE);
        }
        for license in &self.licenses {
            model.add_license(license);
        }
        if self.has_translations {
            let domain = model.name().to_string();
            model.add_locale(&domain);
        }
    }
}

fn first_capture(re: &Option<Regex>, text: &str) -> Option<String> {
    re.as_ref()?
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty() && s != "UNKNOWN")
}

/// Scrape summary, licenses and translations from `source_dir`
pub async fn scrape(source_dir: &Path) -> ArchiveMetadata {
    let mut found = ArchiveMetadata::default();

    if let Ok(text) = fs::read_to_string(source_dir.join("PKG-INFO")).await {
        found.summary = found.summary.or_else(|| first_capture(&PKG_INFO_SUMMARY, &text));
        found.licenses.extend(first_capture(&PKG_INFO_LICENSE, &text));
    }

    if let Ok(text) = fs::read_to_string(source_dir.join("DESCRIPTION")).await {
        found.summary = found.summary.or_else(|| first_capture(&R_TITLE, &text));
        found.licenses.extend(first_capture(&PKG_INFO_LICENSE, &text));
    }

    if let Ok(text) = fs::read_to_string(source_dir.join("META.yml")).await {
        found.summary = found.summary.or_else(|| first_capture(&META_ABSTRACT, &text));
        found.licenses.extend(meta_yml_licenses(&text));
    }

    if let Ok(text) = fs::read_to_string(source_dir.join("package.xml")).await {
        found.summary = found.summary.or_else(|| first_capture(&XML_SUMMARY, &text));
        found.licenses.extend(first_capture(&XML_LICENSE, &text));
    }

    found.has_translations = has_po_files(&source_dir.join("po")).await;
    found
}

/// `license: perl_5` or a block list under `license:`
fn meta_yml_licenses(text: &str) -> Vec<String> {
    let Some(caps) = META_LICENSE.as_ref().and_then(|re| re.captures(text)) else {
        return Vec::new();
    };
    if let Some(scalar) = caps.get(1) {
        return vec![scalar.as_str().trim_matches(['\'', '"']).to_string()];
    }
    caps.get(2)
        .map(|list| {
            list.as_str()
                .lines()
                .filter_map(|line| line.trim().strip_prefix('-'))
                .map(|item| item.trim().trim_matches(['\'', '"']).to_string())
                .filter(|item| !item.is_empty() && item != "unknown")
                .collect()
        })
        .unwrap_or_default()
}

async fn has_po_files(po_dir: &Path) -> bool {
    let Ok(mut entries) = fs::read_dir(po_dir).await else {
        return false;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.path().extension().is_some_and(|ext| ext == "po") {
            return true;
        }
    }
    false
}
