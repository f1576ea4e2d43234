//! End-to-end archive run: enumerate, coordinate, summarise.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{Instrument, info, info_span};

use crate::coordinator::Coordinator;
use crate::enumerator::WorkEnumerator;
use crate::error::CoreResult;
use crate::report::RunSummary;

/// Wires the work enumerator to the coordinator for one run.
#[derive(Clone)]
pub struct ArchivePipeline {
    enumerator: WorkEnumerator,
    coordinator: Coordinator,
}

impl ArchivePipeline {
    /// Construct a pipeline from its two stages.
    #[must_use]
    pub const fn new(enumerator: WorkEnumerator, coordinator: Coordinator) -> Self {
        Self {
            enumerator,
            coordinator,
        }
    }

    /// Archive every scan finished on `date`.
    ///
    /// The listing completes before any task starts. Per-scan failures are part of
    /// the returned summary, not errors.
    ///
    /// # Errors
    ///
    /// Propagates run-fatal [`CoreError`](crate::CoreError)s: listing failures and
    /// worker panics.
    pub async fn run(&self, date: NaiveDate) -> CoreResult<RunSummary> {
        let span = info_span!("archive_run", %date, pool_size = self.coordinator.pool_size());
        async {
            let scan_ids = self.enumerator.list_finished_scans(date).await?;
            if scan_ids.is_empty() {
                let summary = RunSummary::default();
                summary.log();
                return Ok(summary);
            }

            info!(count = scan_ids.len(), "dispatching archive tasks");
            let started = Instant::now();
            let outcomes = self.coordinator.run_all(scan_ids).await?;
            let summary = RunSummary::from_outcomes(&outcomes, started.elapsed());
            summary.log();
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}
