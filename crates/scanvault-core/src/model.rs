//! Identifiers, queries, keys and outcomes shared across the archive run.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content type recorded on every archived object.
pub const JSON_CONTENT_TYPE: &str = "application/json";

const ARCHIVE_SUFFIX: &str = ".json";
const FINISHED_STATUS: &str = "FINISHED";

/// Opaque identifier of one finished scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    /// Wrap an identifier as reported by the listing service.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<u64> for ScanId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ScanId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One `field operator value` filter sent to the listing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// Field name, e.g. `launchedDate`.
    pub field: String,
    /// Comparison operator, e.g. `EQUALS`.
    pub operator: String,
    /// Comparison value.
    pub value: String,
}

impl Criterion {
    fn equals(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            operator: "EQUALS".to_string(),
            value: value.into(),
        }
    }
}

/// Filter describing the scans to archive: launched on a date and finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanListingQuery {
    launched_on: NaiveDate,
    limit_results: u32,
}

impl ScanListingQuery {
    /// Build the query for scans finished on `launched_on`.
    #[must_use]
    pub const fn finished_on(launched_on: NaiveDate, limit_results: u32) -> Self {
        Self {
            launched_on,
            limit_results,
        }
    }

    /// Launch date the query filters on.
    #[must_use]
    pub const fn launched_on(&self) -> NaiveDate {
        self.launched_on
    }

    /// Result cap forwarded to the listing service.
    #[must_use]
    pub const fn limit_results(&self) -> u32 {
        self.limit_results
    }

    /// Filter criteria in the order the listing service expects them.
    #[must_use]
    pub fn criteria(&self) -> Vec<Criterion> {
        vec![
            Criterion::equals(
                "launchedDate",
                self.launched_on.format("%Y-%m-%d").to_string(),
            ),
            Criterion::equals("status", FINISHED_STATUS),
        ]
    }
}

/// Downloaded report document, held in memory between download and archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport(Value);

impl ScanReport {
    /// Wrap a decoded report document.
    #[must_use]
    pub const fn new(document: Value) -> Self {
        Self(document)
    }

    /// Borrow the report document.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.0
    }

    /// Serialise the report into the bytes written to the archive.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; this only happens for documents that cannot
    /// be represented as JSON.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.0)
    }
}

/// Object store key for one scan report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveKey(String);

impl ArchiveKey {
    /// Key for `scan_id`: `<id>.json`, or `<prefix>/<id>.json` when a prefix is configured.
    ///
    /// Distinct identifiers always map to distinct keys under the same prefix.
    #[must_use]
    pub fn for_scan(scan_id: &ScanId, prefix: Option<&str>) -> Self {
        match prefix {
            Some(prefix) => Self(format!("{prefix}/{scan_id}{ARCHIVE_SUFFIX}")),
            None => Self(format!("{scan_id}{ARCHIVE_SUFFIX}")),
        }
    }

    /// Borrow the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Terminal state of one scan identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Report downloaded and written to the archive.
    Archived,
    /// Download exhausted its attempts or failed permanently; nothing was uploaded.
    DownloadFailed {
        /// Last failure observed.
        reason: String,
    },
    /// Report downloaded but the archive write failed.
    UploadFailed {
        /// Last failure observed.
        reason: String,
    },
    /// Never dispatched because the run was cancelled.
    Skipped,
}

impl TaskOutcome {
    /// Stable label used in logs and summaries.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Archived => "archived",
            Self::DownloadFailed { .. } => "download_failed",
            Self::UploadFailed { .. } => "upload_failed",
            Self::Skipped => "skipped",
        }
    }

    /// Failure reason, `None` for archived and skipped scans.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::DownloadFailed { reason } | Self::UploadFailed { reason } => Some(reason),
            Self::Archived | Self::Skipped => None,
        }
    }

    /// Whether the report reached the archive.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        matches!(self, Self::Archived)
    }
}

/// Outcome paired with the identifier it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    /// Scan identifier.
    pub scan_id: ScanId,
    /// Terminal outcome.
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}
