#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Pipeline orchestration for autospec
//!
//! This crate composes the stage crates into the operations the CLI
//! exposes: drafting a spec from a URL, building it, and checking the
//! build log.

mod build;
mod context;
mod draft;
mod logcheck;
mod types;

pub use build::{run_build, BuildDriver, CommandDriver};
pub use context::{OpsContextBuilder, OpsCtx};
pub use draft::draft;
pub use logcheck::logcheck;
pub use autospec_logcheck::LogReport;
pub use types::{BuildOutcome, DraftReport, DraftRequest, ExtraArchive, OperationResult};
