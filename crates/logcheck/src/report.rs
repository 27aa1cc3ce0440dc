//! Report files written next to the build log

use autospec_errors::LogCheckError;
use serde::Serialize;
use std::path::Path;

pub use autospec_config::constants::{CONFIGURE_MISSES as MISSES_FILE, ETC_FILES as ETC_FILES_FILE};

/// Outcome of one postmortem run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogReport {
    /// Sorted report lines (`Configure miss: ...` and forbidden entries)
    pub misses: Vec<String>,
    /// Sorted paths from the `START/etc` block
    pub etc_files: Vec<String>,
}

/// Sorted, newline-joined, single trailing newline
#[must_use]
pub fn render(lines: &[String]) -> String {
    let mut sorted = lines.to_vec();
    sorted.sort();
    let mut text = sorted.join("\n");
    text.push('\n');
    text
}

pub(crate) async fn write(path: &Path, lines: &[String]) -> Result<(), LogCheckError> {
    tokio::fs::write(path, render(lines))
        .await
        .map_err(|e| LogCheckError::ReportWrite {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_sorts_ascii() {
        let lines = vec![
            "Configure miss: zlib".to_string(),
            "Blacklisted configure-miss is forbidden: libbad".to_string(),
            "Configure miss: Xext".to_string(),
        ];
        assert_eq!(
            render(&lines),
            "Blacklisted configure-miss is forbidden: libbad\nConfigure miss: Xext\nConfigure miss: zlib\n"
        );
    }
}
