use serde::{Deserialize, Serialize};

pub mod download;
pub mod draft;
pub mod general;
pub mod logcheck;

pub use download::*;
pub use draft::*;
pub use general::*;
pub use logcheck::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Transfer events
    Download(DownloadEvent),

    /// Classification, merging and spec emission
    Draft(DraftEvent),

    /// Build log postmortem
    LogCheck(LogCheckEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Download(DownloadEvent::Failed { fatal: true, .. })
            | Self::LogCheck(LogCheckEvent::Forbidden { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Download(DownloadEvent::Failed { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Draft(DraftEvent::PhaseAppended { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "autospec::events::general",
            Self::Download(_) => "autospec::events::download",
            Self::Draft(_) => "autospec::events::draft",
            Self::LogCheck(_) => "autospec::events::logcheck",
        }
    }
}
