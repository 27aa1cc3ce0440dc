//! Event handling and user feedback

use crate::logging::log_event_with_tracing;
use autospec_events::{AppEvent, DownloadEvent, DraftEvent, GeneralEvent, LogCheckEvent};
use console::{style, Term};

/// Renders events for the user while the operation runs
pub struct EventHandler {
    colors_enabled: bool,
    debug_enabled: bool,
    term: Term,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
            term: Term::stderr(),
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);

        match event {
            AppEvent::General(general) => self.handle_general(general),
            AppEvent::Download(download) => self.handle_download(download),
            AppEvent::Draft(draft) => self.handle_draft(draft),
            AppEvent::LogCheck(logcheck) => self.handle_logcheck(logcheck),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => self.show_warning(&format!("{message} ({context})")),
                None => self.show_warning(&message),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => self.show_error(&format!("{message}: {details}")),
                None => self.show_error(&message),
            },
            GeneralEvent::Info { message } => self.show_status(&message),
            GeneralEvent::DebugLog { message } => {
                if self.debug_enabled {
                    self.show_debug(&message);
                }
            }
            GeneralEvent::OperationStarted { .. } | GeneralEvent::OperationCompleted { .. } => {}
        }
    }

    fn handle_download(&self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { url, .. } => {
                self.show_status(&format!("Downloading {url}"));
            }
            DownloadEvent::Completed { url, bytes } => {
                if self.debug_enabled {
                    self.show_debug(&format!("Downloaded {url} ({bytes} bytes)"));
                }
            }
            // Fatal failures surface as the command's error
            DownloadEvent::Failed { url, error, fatal } => {
                if !fatal {
                    self.show_warning(&format!("Failed to download {url}: {error}"));
                }
            }
        }
    }

    fn handle_draft(&self, event: DraftEvent) {
        match event {
            DraftEvent::Classified {
                name,
                version,
                hint,
            } => {
                self.show_status(&format!("Package {name} {version} (looks like {hint})"));
            }
            DraftEvent::PatternSelected {
                pattern, source, ..
            } => {
                if self.debug_enabled {
                    self.show_debug(&format!("Build pattern {pattern} from {source}"));
                }
            }
            DraftEvent::RecipeMerged { .. } | DraftEvent::PhaseAppended { .. } => {}
            DraftEvent::FileWritten { path } => {
                self.show_status(&format!("Wrote {}", path.display()));
            }
        }
    }

    fn handle_logcheck(&self, event: LogCheckEvent) {
        match event {
            LogCheckEvent::Miss { token } => {
                self.show_status(&format!("Configure miss: {token}"));
            }
            LogCheckEvent::Forbidden { token } => {
                self.show_error(&format!("Blacklisted configure-miss is forbidden: {token}"));
            }
            LogCheckEvent::ReportWritten { path, entries } => {
                if self.debug_enabled {
                    self.show_debug(&format!("{} ({entries} entries)", path.display()));
                }
            }
        }
    }

    fn show_status(&self, message: &str) {
        let _ = self.term.write_line(message);
    }

    fn show_warning(&self, message: &str) {
        let label = if self.colors_enabled {
            style("WARNING").yellow().bold().to_string()
        } else {
            "WARNING".to_string()
        };
        let _ = self.term.write_line(&format!("{label}: {message}"));
    }

    fn show_error(&self, message: &str) {
        let label = if self.colors_enabled {
            style("ERROR").red().bold().to_string()
        } else {
            "ERROR".to_string()
        };
        let _ = self.term.write_line(&format!("{label}: {message}"));
    }

    fn show_debug(&self, message: &str) {
        let line = if self.colors_enabled {
            style(message).dim().to_string()
        } else {
            message.to_string()
        };
        let _ = self.term.write_line(&line);
    }
}
