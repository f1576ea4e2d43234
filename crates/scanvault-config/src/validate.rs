//! Validation of raw settings into an [`ArchiverConfig`].

use std::time::Duration;

use url::Url;

use crate::defaults::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_BASE_URL, DEFAULT_JITTER_MS, DEFAULT_LIMIT_RESULTS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_POOL_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SCAN_TYPE, ENV_DESTINATION, ENV_PASSWORD, ENV_USERNAME,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ArchiverConfig, Credentials, RawSettings, RetrySettings};

impl TryFrom<RawSettings> for ArchiverConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> ConfigResult<Self> {
        build_config(raw)
    }
}

/// Validate raw settings and apply defaults.
///
/// Required values are checked together so the caller can report every missing
/// name at once, before any other validation runs.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when credentials or the destination are absent,
/// and [`ConfigError::InvalidField`] / [`ConfigError::InvalidUrl`] for malformed values.
pub fn build_config(raw: RawSettings) -> ConfigResult<ArchiverConfig> {
    let username = non_blank(raw.username);
    let password = non_blank(raw.password);
    let destination = non_blank(raw.destination);

    let names: Vec<&'static str> = [
        (ENV_USERNAME, username.is_none()),
        (ENV_PASSWORD, password.is_none()),
        (ENV_DESTINATION, destination.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, missing)| missing.then_some(name))
    .collect();

    let (Some(username), Some(password), Some(destination)) = (username, password, destination)
    else {
        return Err(ConfigError::Missing { names });
    };

    let base_url_raw = non_blank(raw.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(&base_url_raw).map_err(|source| ConfigError::InvalidUrl {
        field: "base_url",
        value: base_url_raw.clone(),
        source,
    })?;
    if base_url.cannot_be_a_base() {
        return Err(ConfigError::InvalidField {
            field: "base_url",
            reason: "not_a_base",
            value: Some(base_url_raw),
        });
    }

    let scan_type = normalize_path(raw.scan_type).unwrap_or_else(|| DEFAULT_SCAN_TYPE.to_string());
    let key_prefix = normalize_path(raw.key_prefix);

    let pool_size = positive(raw.pool_size.unwrap_or(DEFAULT_POOL_SIZE), "pool_size")?;
    let max_attempts = positive(raw.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS), "max_attempts")?;
    let timeout_secs = positive(
        raw.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        "request_timeout_secs",
    )?;
    let limit_results = positive(
        raw.limit_results.unwrap_or(DEFAULT_LIMIT_RESULTS),
        "limit_results",
    )?;

    let base_delay = Duration::from_millis(raw.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS));
    let max_delay = Duration::from_millis(raw.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS));
    if max_delay < base_delay {
        return Err(ConfigError::InvalidField {
            field: "max_delay_ms",
            reason: "below_base_delay",
            value: Some(max_delay.as_millis().to_string()),
        });
    }

    Ok(ArchiverConfig {
        credentials: Credentials { username, password },
        base_url,
        scan_type,
        destination,
        key_prefix,
        pool_size,
        retry: RetrySettings {
            max_attempts,
            base_delay,
            max_delay,
            jitter: Duration::from_millis(raw.jitter_ms.unwrap_or(DEFAULT_JITTER_MS)),
        },
        request_timeout: Duration::from_secs(timeout_secs),
        limit_results,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn normalize_path(value: Option<String>) -> Option<String> {
    non_blank(value)
        .map(|value| value.trim_matches('/').to_string())
        .filter(|value| !value.is_empty())
}

fn positive<T>(value: T, field: &'static str) -> ConfigResult<T>
where
    T: Default + PartialEq + ToString,
{
    if value == T::default() {
        return Err(ConfigError::InvalidField {
            field,
            reason: "must_be_positive",
            value: Some(value.to_string()),
        });
    }
    Ok(value)
}
