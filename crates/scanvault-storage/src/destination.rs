//! Parsing of the archive destination setting.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{StorageError, StorageResult};

const FILE_SCHEME: &str = "file://";
const S3_SCHEME: &str = "s3://";

/// Where archived reports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// An S3 bucket reached through the default AWS credential chain.
    S3 {
        /// Bucket name.
        bucket: String,
    },
    /// A local directory, selected with a `file://` destination.
    Filesystem {
        /// Directory objects are written under.
        root: PathBuf,
    },
}

impl Destination {
    /// Interpret a destination setting.
    ///
    /// `file://<path>` selects a local directory; a bare name or `s3://<bucket>`
    /// selects a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidDestination`] for empty paths and bucket
    /// names containing slashes or whitespace.
    pub fn parse(value: &str) -> StorageResult<Self> {
        let trimmed = value.trim();
        if let Some(path) = trimmed.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(StorageError::invalid(value, "empty_path"));
            }
            return Ok(Self::Filesystem {
                root: PathBuf::from(path),
            });
        }

        let bucket = trimmed
            .strip_prefix(S3_SCHEME)
            .unwrap_or(trimmed)
            .trim_end_matches('/');
        if bucket.is_empty() {
            return Err(StorageError::invalid(value, "empty_bucket"));
        }
        if bucket.contains(|ch: char| ch == '/' || ch.is_whitespace()) {
            return Err(StorageError::invalid(value, "invalid_bucket_name"));
        }
        Ok(Self::S3 {
            bucket: bucket.to_string(),
        })
    }
}

impl FromStr for Destination {
    type Err = StorageError;

    fn from_str(value: &str) -> StorageResult<Self> {
        Self::parse(value)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S3 { bucket } => write!(formatter, "{S3_SCHEME}{bucket}"),
            Self::Filesystem { root } => write!(formatter, "{FILE_SCHEME}{}", root.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_are_buckets() {
        assert_eq!(
            Destination::parse("scan-archive").ok(),
            Some(Destination::S3 {
                bucket: "scan-archive".to_string()
            })
        );
        assert_eq!(
            Destination::parse("s3://scan-archive/").ok(),
            Some(Destination::S3 {
                bucket: "scan-archive".to_string()
            })
        );
    }

    #[test]
    fn file_scheme_selects_directory() {
        assert_eq!(
            Destination::parse("file:///var/lib/scanvault").ok(),
            Some(Destination::Filesystem {
                root: PathBuf::from("/var/lib/scanvault")
            })
        );
    }

    #[test]
    fn malformed_destinations_are_rejected() {
        for (value, expected) in [
            ("file://", "empty_path"),
            ("s3://", "empty_bucket"),
            ("scan archive", "invalid_bucket_name"),
            ("bucket/with/key", "invalid_bucket_name"),
        ] {
            assert!(
                matches!(
                    Destination::parse(value),
                    Err(StorageError::InvalidDestination { reason, .. }) if reason == expected
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn display_round_trips_scheme() {
        let destination = Destination::S3 {
            bucket: "scan-archive".to_string(),
        };
        assert_eq!(destination.to_string(), "s3://scan-archive");
    }
}
