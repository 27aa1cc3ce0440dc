//! Foreign recipe ingestion
//!
//! A recipe is a BitBake-style text file. It is parsed into a
//! [`RecipeDict`] and merged into the spec model by [`merge`].

mod merge;
pub mod parser;

pub use merge::merge;
pub use parser::{AssignOp, RecipeDict, Statement, TaskBlock};

use autospec_errors::{Error, RecipeError};
use std::path::Path;

/// Read and evaluate a recipe file
///
/// # Errors
///
/// Returns an error if the file does not exist or is not readable text.
pub async fn load(path: &Path) -> Result<RecipeDict, Error> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RecipeError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            RecipeError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        }
    })?;
    let dict = RecipeDict::parse(&text);
    tracing::debug!(path = %path.display(), tasks = dict.tasks().count(), "loaded recipe");
    Ok(dict)
}
