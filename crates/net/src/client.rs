//! HTTP client with bounded timeouts

use autospec_config::NetworkConfig;
use autospec_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Minimum acceptable throughput in bytes per second
    pub low_speed_limit: u64,
    /// How long throughput may stay below the limit before aborting
    pub low_speed_time: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            low_speed_limit: config.low_speed_limit,
            low_speed_time: Duration::from_secs(config.low_speed_time),
            user_agent: format!("autospec/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client wrapper
///
/// Redirects are followed by reqwest's default policy. No retries: a
/// transfer is attempted exactly once.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts, connection failures or other transport
    /// problems. HTTP status codes are not checked here.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::convert(url, &e))
    }

    /// Execute a POST request with a raw body
    ///
    /// # Errors
    ///
    /// Same conditions as [`NetClient::get`].
    pub async fn post(&self, url: &str, body: Vec<u8>) -> Result<Response, Error> {
        self.client
            .post(url)
            .body(body)
            .send()
            .await
            .map_err(|e| Self::convert(url, &e))
    }

    /// Get the client configuration
    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub(crate) fn convert(url: &str, error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: url.to_string(),
            }
            .into()
        } else if error.is_connect() {
            NetworkError::ConnectionRefused(error.to_string()).into()
        } else {
            NetworkError::DownloadFailed(error.to_string()).into()
        }
    }
}

impl std::fmt::Debug for NetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
