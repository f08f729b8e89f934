//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Native backend configuration
    #[serde(default)]
    pub watcher: WatcherSection,

    /// Run loop configuration
    #[serde(default)]
    pub run: RunSection,
}

/// Native backend configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherSection {
    /// Receive buffer size in bytes
    pub buffer_size: Option<usize>,

    /// Consecutive receive errors tolerated
    pub receive_retry_limit: Option<u32>,

    /// Also watch IPv6 address changes
    #[serde(default)]
    pub ipv6: bool,
}

/// Run loop configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Exit after this many changes
    pub max_events: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r"# netchange Configuration File

[watcher]
# Receive buffer size in bytes for one netlink datagram (default: 8192)
# Accepted range: 16 to 1048576
# buffer_size = 8192

# Consecutive receive errors tolerated before the watcher gives up (default: 3)
# Interrupted calls and kernel queue overruns are always retried.
# receive_retry_limit = 3

# Also watch IPv6 address changes (Linux only; Windows always watches all families)
# ipv6 = false

[run]
# Exit after this many changes (default: run until Ctrl+C)
# max_events = 10
"
    .to_string()
}
