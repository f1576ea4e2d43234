//! Aggregation of per-scan outcomes into the run summary.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::{ScanId, ScanOutcome, TaskOutcome};

/// A scan that did not reach the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedScan {
    /// Scan identifier.
    pub scan_id: ScanId,
    /// Outcome label (`download_failed`, `upload_failed` or `skipped`).
    pub kind: &'static str,
    /// Failure reason when one was recorded.
    pub reason: Option<String>,
}

/// Counts of every outcome kind plus the identifiers needing follow-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Scans considered by the run.
    pub total: usize,
    /// Scans written to the archive.
    pub archived: usize,
    /// Scans whose download failed.
    pub download_failed: usize,
    /// Scans whose upload failed.
    pub upload_failed: usize,
    /// Scans never dispatched because the run was cancelled.
    pub skipped: usize,
    /// Every scan whose outcome was not `Archived`, in outcome order.
    pub failures: Vec<FailedScan>,
    /// Wall time spent dispatching and settling tasks.
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl RunSummary {
    /// Aggregate `outcomes` without side effects.
    #[must_use]
    pub fn from_outcomes(outcomes: &[ScanOutcome], elapsed: Duration) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            elapsed,
            ..Self::default()
        };
        for ScanOutcome { scan_id, outcome } in outcomes {
            match outcome {
                TaskOutcome::Archived => {
                    summary.archived += 1;
                    continue;
                }
                TaskOutcome::DownloadFailed { .. } => summary.download_failed += 1,
                TaskOutcome::UploadFailed { .. } => summary.upload_failed += 1,
                TaskOutcome::Skipped => summary.skipped += 1,
            }
            summary.failures.push(FailedScan {
                scan_id: scan_id.clone(),
                kind: outcome.kind(),
                reason: outcome.reason().map(str::to_string),
            });
        }
        summary
    }

    /// Whether every scan was archived.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Identifiers needing operator follow-up.
    #[must_use]
    pub fn failed_ids(&self) -> Vec<&ScanId> {
        self.failures.iter().map(|failure| &failure.scan_id).collect()
    }

    /// Emit the summary line and one warning per failed scan.
    pub fn log(&self) {
        info!(
            total = self.total,
            archived = self.archived,
            download_failed = self.download_failed,
            upload_failed = self.upload_failed,
            skipped = self.skipped,
            elapsed_ms = u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            "archive run complete"
        );
        for failure in &self.failures {
            warn!(
                scan_id = %failure.scan_id,
                kind = failure.kind,
                reason = failure.reason.as_deref().unwrap_or("-"),
                "scan requires follow-up"
            );
        }
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
