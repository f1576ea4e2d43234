//! Command-line surface. Every setting can also come from the environment.

use chrono::NaiveDate;
use clap::Parser;

use scanvault_config::RawSettings;
use scanvault_config::defaults::{ENV_DESTINATION, ENV_PASSWORD, ENV_USERNAME};
use scanvault_telemetry::{DEFAULT_LOG_LEVEL, LogFormat};

/// Archive every scan report finished on one day into object storage.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "scanvault", version, about)]
pub struct Cli {
    /// Scanning service account name.
    #[arg(long, env = ENV_USERNAME, hide_env_values = true)]
    pub username: Option<String>,
    /// Scanning service account password.
    #[arg(long, env = ENV_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,
    /// Bucket name, `s3://<bucket>`, or `file://<dir>` for a local archive.
    #[arg(long, env = ENV_DESTINATION)]
    pub destination: Option<String>,
    /// Launch date to archive (YYYY-MM-DD); defaults to today in local time.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// Scanning service API root.
    #[arg(long, env = "SCANVAULT_BASE_URL")]
    pub base_url: Option<String>,
    /// Scan type path, for example `was/wasscan`.
    #[arg(long, env = "SCANVAULT_SCAN_TYPE")]
    pub scan_type: Option<String>,
    /// Concurrent archive workers.
    #[arg(long, env = "SCANVAULT_POOL_SIZE")]
    pub pool_size: Option<usize>,
    /// Attempts per download or upload.
    #[arg(long, env = "SCANVAULT_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,
    /// First retry delay in milliseconds.
    #[arg(long, env = "SCANVAULT_BASE_DELAY_MS")]
    pub base_delay_ms: Option<u64>,
    /// Upper bound on a retry delay in milliseconds.
    #[arg(long, env = "SCANVAULT_MAX_DELAY_MS")]
    pub max_delay_ms: Option<u64>,
    /// Largest random jitter added to a retry delay, in milliseconds.
    #[arg(long, env = "SCANVAULT_JITTER_MS")]
    pub jitter_ms: Option<u64>,
    /// Per-request timeout in seconds.
    #[arg(long, env = "SCANVAULT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
    /// Prefix placed before every archive key.
    #[arg(long, env = "SCANVAULT_KEY_PREFIX")]
    pub key_prefix: Option<String>,
    /// Maximum number of scans the listing may return.
    #[arg(long, env = "SCANVAULT_LIMIT_RESULTS")]
    pub limit_results: Option<u32>,
    /// Log output format (`json` or `pretty`).
    #[arg(long, env = "SCANVAULT_LOG_FORMAT", value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, env = "SCANVAULT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Settings to validate into an archiver configuration.
    #[must_use]
    pub fn raw_settings(&self) -> RawSettings {
        RawSettings {
            username: self.username.clone(),
            password: self.password.clone(),
            destination: self.destination.clone(),
            base_url: self.base_url.clone(),
            scan_type: self.scan_type.clone(),
            key_prefix: self.key_prefix.clone(),
            pool_size: self.pool_size,
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms,
            jitter_ms: self.jitter_ms,
            request_timeout_secs: self.timeout_secs,
            limit_results: self.limit_results,
        }
    }

    /// Log level, falling back to the telemetry default.
    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid date '{input}' (expected YYYY-MM-DD): {err}"))
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input
        .parse()
        .map_err(|_| format!("invalid log format '{input}' (expected json or pretty)"))
}
