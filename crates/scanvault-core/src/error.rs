//! # Design
//!
//! - `RemoteError` is the single failure shape every collaborator returns, so the
//!   retry policy can classify failures without knowing the transport.
//! - `CoreError` only carries run-fatal conditions; per-scan failures are
//!   [`TaskOutcome`](crate::TaskOutcome) values, never errors.

use std::io;

use thiserror::Error;

use crate::model::ScanId;

/// Failure reported by a remote collaborator (listing, download or object store).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The call exceeded its request timeout.
    #[error("{operation} timed out: {detail}")]
    Timeout {
        /// Operation identifier.
        operation: &'static str,
        /// Transport detail.
        detail: String,
    },
    /// Connection or transport level failure.
    #[error("{operation} transport failure: {detail}")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Transport detail.
        detail: String,
    },
    /// The remote answered with a non-success HTTP status.
    #[error("{operation} returned status {status}")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
    },
    /// The response body could not be decoded or the request could not be built.
    #[error("{operation} payload invalid: {detail}")]
    Payload {
        /// Operation identifier.
        operation: &'static str,
        /// Decoder detail.
        detail: String,
    },
    /// The remote accepted the call but reported an application-level failure.
    #[error("{operation} rejected with code {code}")]
    Rejected {
        /// Operation identifier.
        operation: &'static str,
        /// Service response code.
        code: String,
    },
    /// Local IO failure, used by filesystem-backed collaborators.
    #[error("{operation} io failure: {detail}")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// IO error kind.
        kind: io::ErrorKind,
        /// IO detail.
        detail: String,
    },
}

impl RemoteError {
    /// Build an [`RemoteError::Io`] from a standard IO error.
    #[must_use]
    pub fn io(operation: &'static str, source: &io::Error) -> Self {
        Self::Io {
            operation,
            kind: source.kind(),
            detail: source.to_string(),
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Timeouts, transport failures, 408, 429 and 5xx statuses are transient;
    /// everything else is permanent.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Status { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            Self::Io { kind, .. } => matches!(
                kind,
                io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
            ),
            Self::Payload { .. } | Self::Rejected { .. } => false,
        }
    }

    /// Operation identifier attached to the failure.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Timeout { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Payload { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Io { operation, .. } => operation,
        }
    }
}

/// Run-fatal errors raised by the orchestration core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The work set could not be determined; nothing was archived.
    #[error("scan listing unavailable")]
    ListingUnavailable {
        /// Failure reported by the listing service.
        #[source]
        source: RemoteError,
    },
    /// One or more workers panicked; the remaining workers were still awaited.
    #[error("archive worker panicked")]
    WorkerPanicked {
        /// Identifiers whose worker did not produce an outcome.
        scan_ids: Vec<ScanId>,
    },
}

/// Convenience alias for core results.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn transient_failures_are_retryable() {
        let cases = [
            RemoteError::Timeout {
                operation: "download",
                detail: "deadline".to_string(),
            },
            RemoteError::Transport {
                operation: "download",
                detail: "reset".to_string(),
            },
            RemoteError::Status {
                operation: "download",
                status: 503,
            },
            RemoteError::Status {
                operation: "download",
                status: 429,
            },
            RemoteError::io("archive", &io::Error::from(io::ErrorKind::TimedOut)),
        ];
        for err in cases {
            assert!(err.is_retryable(), "{err} should be retryable");
        }
    }

    #[test]
    fn permanent_failures_are_not_retryable() {
        let cases = [
            RemoteError::Status {
                operation: "download",
                status: 404,
            },
            RemoteError::Status {
                operation: "download",
                status: 401,
            },
            RemoteError::Payload {
                operation: "download",
                detail: "eof".to_string(),
            },
            RemoteError::Rejected {
                operation: "search",
                code: "INVALID_CREDENTIALS".to_string(),
            },
            RemoteError::io(
                "archive",
                &io::Error::from(io::ErrorKind::PermissionDenied),
            ),
        ];
        for err in cases {
            assert!(!err.is_retryable(), "{err} should be permanent");
        }
    }

    #[test]
    fn listing_unavailable_exposes_source() {
        let err = CoreError::ListingUnavailable {
            source: RemoteError::Status {
                operation: "search",
                status: 500,
            },
        };
        assert_eq!(err.to_string(), "scan listing unavailable");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("search returned status 500")
        );
    }
}
