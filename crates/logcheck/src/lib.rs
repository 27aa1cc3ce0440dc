#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build log postmortem for autospec
//!
//! Scans a build log for configure checks that came back negative and sorts
//! them against a whitelist and a blacklist. A blacklisted miss is a policy
//! violation: the report is written and an error returned. The file list
//! between `START/etc` and `END/etc` is collected on the way.

pub mod lists;
pub mod report;

pub use lists::{MissList, BLACKLIST_FILE, WHITELIST_FILE};
pub use report::{render, LogReport, ETC_FILES_FILE, MISSES_FILE};

use autospec_errors::{Error, LogCheckError};
use autospec_events::{AppEvent, EventEmitter, LogCheckEvent};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

static CONFIGURE_MISS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"checking (?:for )?(.*?)\.\.\. no").ok());

const FORMAT_NOT_LITERAL: &str = "warning: format not a string literal";

/// Raw findings of one pass over a log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogScan {
    /// Miss candidates in log order
    pub candidates: Vec<String>,
    /// Lines of the `START/etc` block, `+` lines dropped
    pub etc_files: Vec<String>,
}

/// Collect miss candidates and the etc block from log text
#[must_use]
pub fn scan(log: &str) -> LogScan {
    let mut found = LogScan::default();
    let mut lines = log.lines();

    while let Some(line) = lines.next() {
        if line == "START/etc" {
            for inner in lines.by_ref() {
                if inner == "END/etc" {
                    break;
                }
                if !inner.starts_with('+') {
                    found.etc_files.push(inner.to_string());
                }
            }
            continue;
        }

        if !line.contains("none required") {
            let miss = CONFIGURE_MISS
                .as_ref()
                .and_then(|re| re.captures(line))
                .and_then(|caps| caps.get(1));
            if let Some(miss) = miss {
                found.candidates.push(miss.as_str().to_string());
                continue;
            }
        }

        if line.contains(FORMAT_NOT_LITERAL) {
            found.candidates.push(line.to_string());
        }
    }

    found
}

async fn write_report<E: EventEmitter>(
    out_dir: &Path,
    name: &str,
    lines: &[String],
    tx: &E,
) -> Result<(), Error> {
    let path = out_dir.join(name);
    report::write(&path, lines).await?;
    tx.emit(AppEvent::LogCheck(LogCheckEvent::ReportWritten {
        path,
        entries: lines.len(),
    }));
    Ok(())
}

/// Check `log_path` and write `configure_misses` and `etc_files` to
/// `out_dir`.
///
/// Reports are only written when non-empty.
///
/// # Errors
///
/// Returns `BlacklistedMiss` for the first blacklisted candidate, after
/// the misses report has been written. Also fails if the log cannot be read
/// or a report cannot be written.
pub async fn check<E: EventEmitter>(
    log_path: &Path,
    out_dir: &Path,
    whitelist: &MissList,
    blacklist: &MissList,
    tx: &E,
) -> Result<LogReport, Error> {
    let text = tokio::fs::read_to_string(log_path).await.map_err(|e| {
        let path = log_path.display().to_string();
        if e.kind() == std::io::ErrorKind::NotFound {
            LogCheckError::LogNotFound { path }
        } else {
            LogCheckError::ReadFailed {
                path,
                message: e.to_string(),
            }
        }
    })?;

    let found = scan(&text);
    tracing::debug!(
        candidates = found.candidates.len(),
        etc_files = found.etc_files.len(),
        "scanned build log"
    );

    let mut outcome = LogReport::default();

    if !found.etc_files.is_empty() {
        let etc: BTreeSet<String> = found.etc_files.into_iter().collect();
        outcome.etc_files = etc.into_iter().collect();
        write_report(out_dir, ETC_FILES_FILE, &outcome.etc_files, tx).await?;
    }

    let mut misses = BTreeSet::new();
    for candidate in found.candidates {
        if whitelist.contains(&candidate) {
            continue;
        }
        if blacklist.contains(&candidate) {
            misses.insert(format!("Blacklisted configure-miss is forbidden: {candidate}"));
            tx.emit(AppEvent::LogCheck(LogCheckEvent::Forbidden {
                token: candidate.clone(),
            }));
            let lines: Vec<String> = misses.into_iter().collect();
            write_report(out_dir, MISSES_FILE, &lines, tx).await?;
            return Err(LogCheckError::BlacklistedMiss { miss: candidate }.into());
        }
        if misses.insert(format!("Configure miss: {candidate}")) {
            tx.emit(AppEvent::LogCheck(LogCheckEvent::Miss { token: candidate }));
        }
    }

    outcome.misses = misses.into_iter().collect();
    if !outcome.misses.is_empty() {
        write_report(out_dir, MISSES_FILE, &outcome.misses, tx).await?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autospec_events::EventSender;

    const NO_EVENTS: Option<EventSender> = None;

    fn write_log(dir: &Path, text: &str) -> std::path::PathBuf {
        let path = dir.join("build.log");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn scan_finds_candidates_in_order() {
        let found = scan(
            "checking for libfoo... no\n\
             checking for library containing dlopen... none required\n\
             checking whether ln -s works... yes\n\
             checking zlib.h usability... no\n\
             foo.c:3: warning: format not a string literal and no format arguments\n",
        );
        assert_eq!(
            found.candidates,
            [
                "libfoo",
                "zlib.h usability",
                "foo.c:3: warning: format not a string literal and no format arguments",
            ]
        );
    }

    #[test]
    fn etc_block_drops_plus_lines() {
        let found = scan("START/etc\n/etc/foo.conf\n+ cp a b\n/etc/bar.d/x\nEND/etc\n/etc/outside\n");
        assert_eq!(found.etc_files, ["/etc/foo.conf", "/etc/bar.d/x"]);
        assert!(found.candidates.is_empty());
    }

    #[tokio::test]
    async fn whitelisted_misses_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(
            dir.path(),
            "checking for libfoo... no\nchecking for libbar... no\n",
        );
        let whitelist = MissList::parse("libbar\n");

        let report = check(&log, dir.path(), &whitelist, &MissList::default(), &NO_EVENTS)
            .await
            .unwrap();

        assert_eq!(report.misses, ["Configure miss: libfoo"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(MISSES_FILE)).unwrap(),
            "Configure miss: libfoo\n"
        );
        assert!(!dir.path().join(ETC_FILES_FILE).exists());
    }

    #[tokio::test]
    async fn blacklisted_miss_writes_report_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(
            dir.path(),
            "checking for libok... no\nchecking for libbad... no\nchecking for later... no\n",
        );
        let blacklist = MissList::parse("libbad\n");

        let err = check(&log, dir.path(), &MissList::default(), &blacklist, &NO_EVENTS)
            .await
            .unwrap_err();
        assert!(err.is_policy_violation());

        let written = std::fs::read_to_string(dir.path().join(MISSES_FILE)).unwrap();
        assert!(written
            .lines()
            .any(|l| l == "Blacklisted configure-miss is forbidden: libbad"));
        assert!(written.lines().any(|l| l == "Configure miss: libok"));
        assert!(!written.contains("later"));
    }

    #[tokio::test]
    async fn single_unlisted_miss() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "make[1]: ok\nchecking for foo... no\n");

        check(&log, dir.path(), &MissList::default(), &MissList::default(), &NO_EVENTS)
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join(MISSES_FILE)).unwrap(),
            "Configure miss: foo\n"
        );
    }

    #[tokio::test]
    async fn repeated_runs_write_identical_reports() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(
            dir.path(),
            "checking for zzz... no\nSTART/etc\n/etc/b\n/etc/a\nEND/etc\nchecking for aaa... no\n",
        );
        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();

        let first = check(&log, dir.path(), &MissList::default(), &MissList::default(), &NO_EVENTS)
            .await
            .unwrap();
        let (misses, etc) = (read(MISSES_FILE), read(ETC_FILES_FILE));

        let second = check(&log, dir.path(), &MissList::default(), &MissList::default(), &NO_EVENTS)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(read(MISSES_FILE), misses);
        assert_eq!(read(ETC_FILES_FILE), etc);
        assert_eq!(etc, "/etc/a\n/etc/b\n");
        assert_eq!(misses, "Configure miss: aaa\nConfigure miss: zzz\n");
    }

    #[tokio::test]
    async fn missing_log_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = check(
            &dir.path().join("build.log"),
            dir.path(),
            &MissList::default(),
            &MissList::default(),
            &NO_EVENTS,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::LogCheck(LogCheckError::LogNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn misses_are_announced() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "checking for libfoo... no\n");
        let (tx, mut rx) = autospec_events::channel();

        check(&log, dir.path(), &MissList::default(), &MissList::default(), &tx)
            .await
            .unwrap();

        match rx.try_recv() {
            Ok(AppEvent::LogCheck(LogCheckEvent::Miss { token })) => assert_eq!(token, "libfoo"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
