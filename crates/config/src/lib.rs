#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for autospec
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/autospec/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;

use autospec_errors::{ConfigError, Error};
use autospec_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory holding translate.dic and the configure lists
    pub assets_dir: Option<PathBuf>,
    /// Root for package directories when --output is not given
    pub output_dir: Option<PathBuf>,
}

/// Transfer limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_low_speed_limit")]
    pub low_speed_limit: u64, // bytes per second
    #[serde(default = "default_low_speed_time")]
    pub low_speed_time: u64, // seconds
}

/// External metadata providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Query the Python package index for distutils3 packages
    #[serde(default = "default_true")]
    pub pypi: bool,
    /// Run the reverse-dependency query
    #[serde(default)]
    pub whatrequires: bool,
    #[serde(default = "default_yum_conf")]
    pub yum_conf: PathBuf,
    #[serde(default = "default_pip")]
    pub pip: String,
    #[serde(default = "default_virtualenv")]
    pub virtualenv: String,
    #[serde(default = "default_repoquery")]
    pub repoquery: String,
    #[serde(default = "default_yum")]
    pub yum: String,
}

/// External build driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Command run in the package directory; the spec path is appended
    #[serde(default = "default_build_command")]
    pub command: Vec<String>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            timeout: 600, // 10 minutes
            low_speed_limit: 1,
            low_speed_time: 10,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            pypi: true,
            whatrequires: false,
            yum_conf: default_yum_conf(),
            pip: default_pip(),
            virtualenv: default_virtualenv(),
            repoquery: default_repoquery(),
            yum: default_yum(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: default_build_command(),
        }
    }
}

// Default value functions for serde
fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_timeout() -> u64 {
    600
}

fn default_low_speed_limit() -> u64 {
    1
}

fn default_low_speed_time() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_yum_conf() -> PathBuf {
    PathBuf::from("/etc/yum.conf")
}

fn default_pip() -> String {
    "pip3".to_string()
}

fn default_virtualenv() -> String {
    "virtualenv".to_string()
}

fn default_repoquery() -> String {
    "repoquery".to_string()
}

fn default_yum() -> String {
    "yum".to_string()
}

fn default_build_command() -> Vec<String> {
    vec!["rpmbuild".to_string(), "-ba".to_string()]
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("autospec").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading configuration");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge overrides from any variable source
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value of the wrong shape.
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // AUTOSPEC_COLOR
        if let Some(color) = lookup("AUTOSPEC_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "AUTOSPEC_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // AUTOSPEC_ASSETS_DIR
        if let Some(dir) = lookup("AUTOSPEC_ASSETS_DIR") {
            self.paths.assets_dir = Some(PathBuf::from(dir));
        }

        // AUTOSPEC_YUM_CONF
        if let Some(conf) = lookup("AUTOSPEC_YUM_CONF") {
            self.metadata.yum_conf = PathBuf::from(conf);
        }

        // AUTOSPEC_PYPI
        if let Some(pypi) = lookup("AUTOSPEC_PYPI") {
            self.metadata.pypi = parse_bool("AUTOSPEC_PYPI", pypi)?;
        }

        // AUTOSPEC_TIMEOUT
        if let Some(timeout) = lookup("AUTOSPEC_TIMEOUT") {
            self.network.timeout = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "AUTOSPEC_TIMEOUT".to_string(),
                value: timeout,
            })?;
        }

        Ok(())
    }

    /// Directory holding the tool's data files
    #[must_use]
    pub fn assets_dir(&self) -> PathBuf {
        self.paths
            .assets_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_ASSETS_DIR))
    }

    /// Package directory for a package, honoring the configured output root
    #[must_use]
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.paths
            .output_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join(name)
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}
