#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Spec model and spec-file emission for autospec

mod emit;
pub mod model;
pub mod translate;

pub use emit::FrozenSpec;
pub use model::{ArchiveDetail, SpecModel, ARCHIVE_SUMMARY_SCORE, REGISTRY_SUMMARY_SCORE};
pub use translate::Translations;
