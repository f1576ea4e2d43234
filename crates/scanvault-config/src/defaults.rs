//! Default values and environment variable names for run configuration.
//!
//! # Design
//! - Keep every tunable in one place so the CLI, validation and tests agree.
//! - Durations are expressed in milliseconds or seconds as named.

/// Environment variable carrying the scanning service username.
pub const ENV_USERNAME: &str = "QUALYS_USERNAME";
/// Environment variable carrying the scanning service password.
pub const ENV_PASSWORD: &str = "QUALYS_PASSWORD";
/// Environment variable naming the archive destination (bucket or `file://` path).
pub const ENV_DESTINATION: &str = "S3_BUCKET_NAME";

/// Base URL of the scanning service REST API.
pub const DEFAULT_BASE_URL: &str = "https://qualysapi.qg3.apps.qualys.com/qps/rest/3.0";
/// Scan type path used for both search and download endpoints.
pub const DEFAULT_SCAN_TYPE: &str = "was/wasscan";
/// Concurrent fetch-and-archive workers.
pub const DEFAULT_POOL_SIZE: usize = 5;
/// Attempts per remote step before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// First retry delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;
/// Upper bound on any single retry delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
/// Upper bound of the random jitter added to each delay, in milliseconds.
pub const DEFAULT_JITTER_MS: u64 = 500;
/// Per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
/// Result cap sent with the listing query.
pub const DEFAULT_LIMIT_RESULTS: u32 = 1_000;
