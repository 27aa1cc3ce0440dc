#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! External metadata providers for autospec
//!
//! Both providers shell out through a [`ToolRunner`], so tests can swap in
//! a scripted runner. Neither ever aborts the pipeline: failures become
//! warning events and empty results.

pub mod pypi;
pub mod runner;
pub mod whatrequires;

pub use pypi::{PypiMetadata, PypiProvider};
pub use runner::{CommandOutput, SystemRunner, ToolCommand, ToolRunner};
pub use whatrequires::WhatRequires;
