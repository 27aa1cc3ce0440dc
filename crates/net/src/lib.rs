#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for autospec
//!
//! One transfer per call: follow redirects, fail on HTTP >= 400, bounded
//! connect/total timeouts and a low-speed abort. Non-fatal failures are
//! reported as events and surface as `Ok(None)`.

mod client;
mod transfer;

pub use client::{NetClient, NetConfig};
pub use transfer::{fetch, FetchRequest, Fetched};

use autospec_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}
