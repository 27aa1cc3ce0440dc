//! Fixed file names read and written in the package directory
//!
//! These names are part of the tool's external contract.

pub const CONFIGURE_MISSES: &str = "configure_misses";
pub const ETC_FILES: &str = "etc_files";
pub const WHATREQUIRES: &str = "whatrequires";
pub const OPTIONS_FILE: &str = "options.toml";
pub const RESULTS_DIR: &str = "results";
pub const BUILD_LOG: &str = "build.log";

pub const TRANSLATE_DIC: &str = "translate.dic";
pub const CONFIGURE_WHITELIST: &str = "configure_whitelist";
pub const CONFIGURE_BLACKLIST: &str = "configure_blacklist";

/// Assets directory used when neither config nor environment names one
pub const DEFAULT_ASSETS_DIR: &str = "/usr/share/autospec";
