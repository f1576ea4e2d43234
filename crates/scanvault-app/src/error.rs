//! # Design
//!
//! - Centralize application-level errors for bootstrap and the archive run.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Configuration problems exit with 2, everything else that aborts a run with 3.

use std::error::Error as _;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required settings were missing or malformed.
    #[error("invalid configuration")]
    Config {
        /// Source configuration error.
        #[source]
        source: scanvault_config::ConfigError,
    },
    /// The archive destination could not be interpreted.
    #[error("invalid archive destination")]
    Destination {
        /// Source storage error.
        #[source]
        source: scanvault_storage::StorageError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        #[source]
        source: scanvault_telemetry::TelemetryError,
    },
    /// The scanning service client could not be built.
    #[error("scan service client construction failed")]
    Client {
        /// Source client error.
        #[source]
        source: scanvault_qualys::QualysError,
    },
    /// The object store could not be opened.
    #[error("object store unavailable")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Source storage error.
        #[source]
        source: scanvault_storage::StorageError,
    },
    /// The archive run aborted.
    #[error("archive run aborted")]
    Run {
        /// Source run error.
        #[source]
        source: scanvault_core::CoreError,
    },
}

impl AppError {
    pub(crate) const fn config(source: scanvault_config::ConfigError) -> Self {
        Self::Config { source }
    }

    pub(crate) const fn destination(source: scanvault_storage::StorageError) -> Self {
        Self::Destination { source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: scanvault_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn client(source: scanvault_qualys::QualysError) -> Self {
        Self::Client { source }
    }

    pub(crate) const fn storage(
        operation: &'static str,
        source: scanvault_storage::StorageError,
    ) -> Self {
        Self::Storage { operation, source }
    }

    pub(crate) const fn run(source: scanvault_core::CoreError) -> Self {
        Self::Run { source }
    }

    /// Process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } | Self::Destination { .. } => 2,
            Self::Telemetry { .. } | Self::Client { .. } | Self::Storage { .. } | Self::Run { .. } => {
                3
            }
        }
    }

    /// The error and its sources joined into one line.
    #[must_use]
    pub fn display_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
