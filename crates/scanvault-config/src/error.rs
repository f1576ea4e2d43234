//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required values were absent or blank.
    #[error("missing required configuration: {}", names.join(", "))]
    Missing {
        /// Environment variable names of every missing value, in declaration order.
        names: Vec<&'static str>,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field '{field}': {reason}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// URL value could not be parsed.
    #[error("invalid URL for '{field}'")]
    InvalidUrl {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Underlying parse failure.
        source: url::ParseError,
    },
}

impl ConfigError {
    /// Names of missing required values, empty for other variants.
    #[must_use]
    pub fn missing_names(&self) -> &[&'static str] {
        match self {
            Self::Missing { names } => names,
            _ => &[],
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
