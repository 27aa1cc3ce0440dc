use autospec_types::{BuildPattern, Phase};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Spec synthesis events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DraftEvent {
    /// URL classified into name, version and hint
    Classified {
        name: String,
        version: String,
        hint: BuildPattern,
    },

    /// A hint replaced the current build pattern
    PatternSelected {
        pattern: BuildPattern,
        strength: u32,
        source: String,
    },

    /// A recipe field was merged into the spec model
    RecipeMerged { field: String, value: String },

    /// Snippets were appended to a phase file
    PhaseAppended { phase: Phase, lines: usize },

    /// An output file was written
    FileWritten { path: PathBuf },
}
