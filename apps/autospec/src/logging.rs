//! Structured logging integration for events
//!
//! Every event the CLI receives is mirrored into tracing at the level the
//! event itself reports, with its fields attached.

use autospec_events::{AppEvent, DownloadEvent, DraftEvent, GeneralEvent, LogCheckEvent};
use tracing::Level;

macro_rules! log_at {
    ($level:expr, $target:literal, $($rest:tt)+) => {{
        let level = $level;
        if level == Level::ERROR {
            tracing::error!(target: $target, $($rest)+);
        } else if level == Level::WARN {
            tracing::warn!(target: $target, $($rest)+);
        } else if level == Level::INFO {
            tracing::info!(target: $target, $($rest)+);
        } else if level == Level::DEBUG {
            tracing::debug!(target: $target, $($rest)+);
        } else {
            tracing::trace!(target: $target, $($rest)+);
        }
    }};
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let level = event.log_level();
    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                log_at!(level, "autospec::events::general", context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                log_at!(level, "autospec::events::general", details = ?details, "{message}");
            }
            GeneralEvent::Info { message } | GeneralEvent::DebugLog { message } => {
                log_at!(level, "autospec::events::general", "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                log_at!(level, "autospec::events::general", operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                log_at!(
                    level,
                    "autospec::events::general",
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
        },

        AppEvent::Download(download) => match download {
            DownloadEvent::Started { url, destination } => {
                log_at!(
                    level,
                    "autospec::events::download",
                    url = %url,
                    destination = ?destination,
                    "Download started"
                );
            }
            DownloadEvent::Completed { url, bytes } => {
                log_at!(level, "autospec::events::download", url = %url, bytes = bytes, "Download completed");
            }
            DownloadEvent::Failed { url, error, fatal } => {
                log_at!(
                    level,
                    "autospec::events::download",
                    url = %url,
                    error = %error,
                    fatal = fatal,
                    "Download failed"
                );
            }
        },

        AppEvent::Draft(draft) => match draft {
            DraftEvent::Classified {
                name,
                version,
                hint,
            } => {
                log_at!(
                    level,
                    "autospec::events::draft",
                    name = %name,
                    version = %version,
                    hint = %hint,
                    "Classified URL"
                );
            }
            DraftEvent::PatternSelected {
                pattern,
                strength,
                source,
            } => {
                log_at!(
                    level,
                    "autospec::events::draft",
                    pattern = %pattern,
                    strength = strength,
                    source = %source,
                    "Build pattern selected"
                );
            }
            DraftEvent::RecipeMerged { field, value } => {
                log_at!(level, "autospec::events::draft", field = %field, value = %value, "Recipe field merged");
            }
            DraftEvent::PhaseAppended { phase, lines } => {
                log_at!(
                    level,
                    "autospec::events::draft",
                    phase = phase.file_name(),
                    lines = lines,
                    "Phase snippet appended"
                );
            }
            DraftEvent::FileWritten { path } => {
                log_at!(level, "autospec::events::draft", path = %path.display(), "File written");
            }
        },

        AppEvent::LogCheck(logcheck) => match logcheck {
            LogCheckEvent::Miss { token } => {
                log_at!(level, "autospec::events::logcheck", token = %token, "Configure miss");
            }
            LogCheckEvent::Forbidden { token } => {
                log_at!(level, "autospec::events::logcheck", token = %token, "Blacklisted configure-miss");
            }
            LogCheckEvent::ReportWritten { path, entries } => {
                log_at!(
                    level,
                    "autospec::events::logcheck",
                    path = %path.display(),
                    entries = entries,
                    "Report written"
                );
            }
        },
    }
}
