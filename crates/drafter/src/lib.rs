#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Source analysis for autospec
//!
//! Everything that looks at the upstream source before a spec is written:
//! URL classification, archive extraction, build system detection,
//! metadata scraping and foreign recipe ingestion.

mod archive;
mod detector;
mod metadata;
pub mod recipe;
pub mod url;

pub use archive::{extract, sha256_file};
pub use detector::detect;
pub use metadata::{scrape, ArchiveMetadata};
pub use recipe::{RecipeDict, Statement, TaskBlock};
pub use url::{archive_filename, classify, Classification};

use autospec_errors::Error;

/// Type alias for results in this crate
pub type Result<T> = std::result::Result<T, Error>;
