//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A value is outside its accepted range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}

/// Well-known field names for `InvalidValue` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The receive buffer size field.
    pub const BUFFER_SIZE: &str = "buffer_size";
    /// The event count limit field.
    pub const MAX_EVENTS: &str = "max_events";
}

impl ConfigError {
    /// Creates an `InvalidValue` error for a field.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_value_displays_field_and_reason() {
        let error = ConfigError::invalid(field::MAX_EVENTS, "must be greater than 0");
        assert_eq!(
            error.to_string(),
            "Invalid value for max_events: must be greater than 0"
        );
    }

    #[test]
    fn file_read_preserves_source() {
        let error = ConfigError::FileRead {
            path: PathBuf::from("/missing.toml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert!(error.to_string().contains("/missing.toml"));
        assert!(error.source().is_some());
    }
}
