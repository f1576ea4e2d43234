//! # Design
//!
//! - Construction failures only; request failures are reported as
//!   [`RemoteError`](scanvault_core::RemoteError) so the retry policy can classify them.

use thiserror::Error;

/// Result type for client construction.
pub type QualysResult<T> = Result<T, QualysError>;

/// Errors raised while building a [`QualysClient`](crate::QualysClient).
#[derive(Debug, Error)]
pub enum QualysError {
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Build {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The base URL cannot carry the endpoint path.
    #[error("base URL cannot carry endpoint paths")]
    InvalidEndpoint {
        /// Base URL that was rejected.
        base_url: String,
    },
    /// The scan type does not form a usable path.
    #[error("scan type is empty")]
    EmptyScanType,
}

impl QualysError {
    /// Build an [`QualysError::InvalidEndpoint`] for `base_url`.
    #[must_use]
    pub fn invalid_endpoint(base_url: &url::Url) -> Self {
        Self::InvalidEndpoint {
            base_url: base_url.to_string(),
        }
    }
}
