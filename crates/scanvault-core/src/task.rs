//! Fetch-and-archive unit of work.
//!
//! Download and upload are retried independently: an upload failure never
//! re-triggers the download. Every failure is folded into a [`TaskOutcome`].

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::backoff::BackoffPolicy;
use crate::model::{ArchiveKey, JSON_CONTENT_TYPE, ScanId, TaskOutcome};
use crate::service::{ObjectStore, ReportSource};

/// Downloads one report and writes it to the archive.
#[derive(Clone)]
pub struct ArchiveTask {
    reports: Arc<dyn ReportSource>,
    store: Arc<dyn ObjectStore>,
    policy: BackoffPolicy,
    key_prefix: Option<Arc<str>>,
}

impl ArchiveTask {
    /// Construct a task over shared collaborators.
    #[must_use]
    pub fn new(
        reports: Arc<dyn ReportSource>,
        store: Arc<dyn ObjectStore>,
        policy: BackoffPolicy,
    ) -> Self {
        Self {
            reports,
            store,
            policy,
            key_prefix: None,
        }
    }

    /// Place every archived object under `prefix`.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: Option<&str>) -> Self {
        self.key_prefix = prefix.map(Arc::from);
        self
    }

    /// Key the report for `scan_id` is written under.
    #[must_use]
    pub fn key_for(&self, scan_id: &ScanId) -> ArchiveKey {
        ArchiveKey::for_scan(scan_id, self.key_prefix.as_deref())
    }

    /// Download, serialise and archive the report for `scan_id`.
    pub async fn process(&self, scan_id: &ScanId) -> TaskOutcome {
        let subject = scan_id.as_str();
        info!(scan_id = subject, "downloading report");
        let report = match self
            .policy
            .retry("download", subject, |_| self.reports.download(scan_id))
            .await
        {
            Ok(report) => report,
            Err(failure) => {
                error!(scan_id = subject, attempts = failure.attempts, error = %failure.last, "download failed");
                return TaskOutcome::DownloadFailed {
                    reason: failure.to_string(),
                };
            }
        };

        let body = match report.to_bytes() {
            Ok(body) => body,
            Err(err) => {
                error!(scan_id = subject, error = %err, "report serialisation failed");
                return TaskOutcome::UploadFailed {
                    reason: format!("report serialisation failed: {err}"),
                };
            }
        };

        let key = self.key_for(scan_id);
        info!(
            scan_id = subject,
            key = %key,
            bytes = body.len(),
            destination = %self.store.describe(),
            "uploading report"
        );
        let uploaded = self
            .policy
            .retry("upload", subject, |_| {
                self.store.put(&key, body.clone(), JSON_CONTENT_TYPE)
            })
            .await;

        match uploaded {
            Ok(()) => {
                info!(scan_id = subject, key = %key, "report archived");
                TaskOutcome::Archived
            }
            Err(failure) => {
                warn!(scan_id = subject, key = %key, attempts = failure.attempts, error = %failure.last, "upload failed");
                TaskOutcome::UploadFailed {
                    reason: failure.to_string(),
                }
            }
        }
    }
}
