//! # Design
//!
//! - Constant messages; the offending value and operation travel as fields.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store construction.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while resolving or opening an object store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The destination string does not name a usable bucket or directory.
    #[error("invalid archive destination")]
    InvalidDestination {
        /// Destination as supplied.
        value: String,
        /// Machine-readable rejection reason.
        reason: &'static str,
    },
    /// Filesystem failure while preparing a local store.
    #[error("storage io failure")]
    Io {
        /// Operation that failed.
        operation: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub(crate) fn invalid(value: &str, reason: &'static str) -> Self {
        Self::InvalidDestination {
            value: value.to_string(),
            reason,
        }
    }
}
