//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;

use crate::watcher::WatcherConfig;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Backend configuration for the watcher
    pub watcher: WatcherConfig,

    /// Stop after this many changes (`None` = run until shutdown signal)
    pub max_events: Option<u64>,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max_events_str = self
            .max_events
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string());

        write!(
            f,
            "Config {{ buffer_size: {}B, retry_limit: {}, ipv6: {}, max_events: {} }}",
            self.watcher.buffer_size(),
            self.watcher.receive_retry_limit(),
            self.watcher.ipv6(),
            max_events_str,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The buffer size is outside the accepted range
    /// - `max_events` is zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let buffer_size = Self::resolve_buffer_size(cli, toml)?;

        // Priority: CLI explicit > TOML > default
        let retry_limit = cli
            .retry_limit
            .or_else(|| toml.and_then(|t| t.watcher.receive_retry_limit))
            .unwrap_or(defaults::RECEIVE_RETRY_LIMIT);

        // Flags only enable
        let ipv6 = cli.ipv6 || toml.is_some_and(|t| t.watcher.ipv6);

        let max_events = Self::resolve_max_events(cli, toml)?;

        let watcher = WatcherConfig::default()
            .with_buffer_size(buffer_size)
            .with_receive_retry_limit(retry_limit)
            .with_ipv6(ipv6);

        Ok(Self {
            watcher,
            max_events,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_buffer_size(cli: &Cli, toml: Option<&TomlConfig>) -> Result<usize, ConfigError> {
        let bytes = cli
            .buffer_size
            .or_else(|| toml.and_then(|t| t.watcher.buffer_size))
            .unwrap_or(defaults::BUFFER_SIZE);

        if !(defaults::MIN_BUFFER_SIZE..=defaults::MAX_BUFFER_SIZE).contains(&bytes) {
            return Err(ConfigError::invalid(
                field::BUFFER_SIZE,
                format!(
                    "{bytes} is outside {}..={}",
                    defaults::MIN_BUFFER_SIZE,
                    defaults::MAX_BUFFER_SIZE
                ),
            ));
        }

        Ok(bytes)
    }

    fn resolve_max_events(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<u64>, ConfigError> {
        let max_events = cli
            .max_events
            .or_else(|| toml.and_then(|t| t.run.max_events));

        if max_events == Some(0) {
            return Err(ConfigError::invalid(
                field::MAX_EVENTS,
                "must be greater than 0",
            ));
        }

        Ok(max_events)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
