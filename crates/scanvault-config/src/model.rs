//! Typed configuration models.
//!
//! # Design
//! - `RawSettings` is the unvalidated union of flags and environment values.
//! - `ArchiverConfig` is built once per run and passed by reference; nothing here is global.

use std::fmt;
use std::time::Duration;

use url::Url;

/// Unvalidated settings gathered from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    /// Scanning service username.
    pub username: Option<String>,
    /// Scanning service password.
    pub password: Option<String>,
    /// Archive destination: an S3 bucket name or a `file://` directory.
    pub destination: Option<String>,
    /// Override for the scanning service base URL.
    pub base_url: Option<String>,
    /// Override for the scan type path segment(s).
    pub scan_type: Option<String>,
    /// Optional key prefix applied to every archived object.
    pub key_prefix: Option<String>,
    /// Worker pool size.
    pub pool_size: Option<usize>,
    /// Attempts per remote step.
    pub max_attempts: Option<u32>,
    /// First retry delay in milliseconds.
    pub base_delay_ms: Option<u64>,
    /// Retry delay cap in milliseconds.
    pub max_delay_ms: Option<u64>,
    /// Jitter upper bound in milliseconds.
    pub jitter_ms: Option<u64>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Listing result cap.
    pub limit_results: Option<u32>,
}

/// Basic-auth credentials for the scanning service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Retry tuning shared by the download and upload steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Attempts before a step is reported as failed.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Upper bound of the random jitter added to each delay.
    pub jitter: Duration,
}

/// Validated configuration for one archive run.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    /// Scanning service credentials.
    pub credentials: Credentials,
    /// Scanning service REST base URL.
    pub base_url: Url,
    /// Scan type path, e.g. `was/wasscan`.
    pub scan_type: String,
    /// Archive destination identifier.
    pub destination: String,
    /// Optional key prefix without leading or trailing slashes.
    pub key_prefix: Option<String>,
    /// Concurrent worker count, always at least one.
    pub pool_size: usize,
    /// Retry policy settings.
    pub retry: RetrySettings,
    /// Timeout applied to every remote call.
    pub request_timeout: Duration,
    /// Listing result cap.
    pub limit_results: u32,
}
