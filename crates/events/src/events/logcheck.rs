use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build log postmortem events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LogCheckEvent {
    /// Configure-miss not covered by the whitelist
    Miss { token: String },

    /// Configure-miss listed in the blacklist
    Forbidden { token: String },

    /// A report file was written
    ReportWritten { path: PathBuf, entries: usize },
}
