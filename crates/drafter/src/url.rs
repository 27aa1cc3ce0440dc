//! Name, version and build-pattern hint from a source URL

use autospec_types::BuildPattern;

/// Archive suffixes peeled before splitting off the version, longest first
const ARCHIVE_SUFFIXES: [&str; 8] = [
    ".tar.bz2", ".tar.gz", ".tar.xz", ".tbz2", ".tgz", ".txz", ".tar", ".zip",
];

/// What a URL says about the package behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub name: String,
    /// Empty when no version could be found
    pub version: String,
    pub hint: BuildPattern,
}

/// Classify a source URL. Never fails.
#[must_use]
pub fn classify(url: &str) -> Classification {
    let hint = pattern_hint(url);

    if let Some((name, version)) = github_archive(url) {
        return Classification {
            name,
            version,
            hint,
        };
    }

    let stem = strip_archive_suffix(&archive_filename(url)).to_string();
    let split = if hint == BuildPattern::R {
        split_version(&stem, '_', Pick::First)
    } else {
        split_version(&stem, '-', Pick::Last).or_else(|| split_version(&stem, '_', Pick::Last))
    };

    let (name, version) = split.unwrap_or((stem.as_str(), ""));
    Classification {
        name: name.to_string(),
        version: version.to_string(),
        hint,
    }
}

/// Last path segment of a URL, without query or fragment
#[must_use]
pub fn archive_filename(url: &str) -> String {
    if let Ok(parsed) = ::url::Url::parse(url) {
        if let Some(last) = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        {
            return last.to_string();
        }
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .to_string()
}

/// Drop a known archive suffix, case-insensitively
#[must_use]
pub fn strip_archive_suffix(filename: &str) -> &str {
    let lower = filename.to_ascii_lowercase();
    ARCHIVE_SUFFIXES
        .iter()
        .find(|suffix| lower.ends_with(*suffix))
        .map_or(filename, |suffix| &filename[..filename.len() - suffix.len()])
}

fn host(url: &str) -> String {
    ::url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default()
}

fn pattern_hint(url: &str) -> BuildPattern {
    let host = host(url);
    if host == "cran.r-project.org" || url.contains("/cran/") || url.contains("/CRAN/") {
        BuildPattern::R
    } else if host.starts_with("pypi.") || url.contains("/pypi/") {
        BuildPattern::Distutils3
    } else if host == "cpan.metacpan.org" || host == "search.cpan.org" {
        BuildPattern::Cpan
    } else if host == "pecl.php.net" {
        BuildPattern::Phpize
    } else {
        BuildPattern::Make
    }
}

#[derive(Clone, Copy)]
enum Pick {
    First,
    Last,
}

/// Split at a separator that is immediately followed by a digit
fn split_version(stem: &str, separator: char, pick: Pick) -> Option<(&str, &str)> {
    let mut positions = stem.char_indices().filter_map(|(i, c)| {
        let rest = &stem[i + c.len_utf8()..];
        (c == separator && i > 0 && rest.starts_with(|d: char| d.is_ascii_digit())).then_some(i)
    });
    let at = match pick {
        Pick::First => positions.next(),
        Pick::Last => positions.last(),
    }?;
    Some((&stem[..at], &stem[at + 1..]))
}

/// `github.com/<owner>/<repo>/archive/[refs/tags/]v?<ver>.<ext>`
fn github_archive(url: &str) -> Option<(String, String)> {
    let parsed = ::url::Url::parse(url).ok()?;
    if parsed.host_str()? != "github.com" {
        return None;
    }
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    if segments.len() < 4 || segments[2] != "archive" {
        return None;
    }

    let repo = segments[1];
    let tag = strip_archive_suffix(segments.last()?);
    let tag = tag
        .strip_prefix(repo)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(tag);
    let version = tag
        .strip_prefix('v')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(tag);

    Some((repo.to_string(), version.to_string()))
}
