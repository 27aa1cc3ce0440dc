use serde::{Deserialize, Serialize};

/// Transfer lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    Started {
        url: String,
        destination: Option<String>,
    },

    Completed {
        url: String,
        bytes: u64,
    },

    Failed {
        url: String,
        error: String,
        fatal: bool,
    },
}
