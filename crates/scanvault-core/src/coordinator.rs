//! Bounded worker pool running one [`ArchiveTask`] per scan identifier.
//!
//! # Design
//! - A semaphore permit is acquired before a worker is spawned, so at most
//!   `pool_size` workers exist at any instant.
//! - Each worker owns one pre-allocated outcome slot; slots are filled after join.
//! - Cancellation stops dispatch only. In-flight workers settle normally and
//!   identifiers that were never dispatched are reported as skipped.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::{ScanId, ScanOutcome, TaskOutcome};
use crate::task::ArchiveTask;

/// Runs archive tasks under a fixed concurrency bound.
#[derive(Clone)]
pub struct Coordinator {
    task: ArchiveTask,
    pool_size: usize,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Construct a coordinator; `pool_size` is clamped to at least one worker.
    #[must_use]
    pub fn new(task: ArchiveTask, pool_size: usize) -> Self {
        Self {
            task,
            pool_size: pool_size.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop dispatching when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Worker pool size.
    #[must_use]
    pub const fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Archive every identifier and return exactly one outcome per input.
    ///
    /// Outcomes are returned in input order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WorkerPanicked`] if a worker panicked. Every other
    /// worker is still awaited before the error is returned.
    pub async fn run_all(&self, scan_ids: Vec<ScanId>) -> CoreResult<Vec<ScanOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut slots: Vec<Option<TaskOutcome>> = vec![None; scan_ids.len()];
        let mut workers: Vec<(usize, JoinHandle<TaskOutcome>)> = Vec::with_capacity(scan_ids.len());

        for (index, scan_id) in scan_ids.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                warn!(
                    dispatched = index,
                    remaining = scan_ids.len() - index,
                    "dispatch stopped; remaining scans skipped"
                );
                break;
            };

            let task = self.task.clone();
            let scan_id = scan_id.clone();
            workers.push((
                index,
                tokio::spawn(async move {
                    let outcome = task.process(&scan_id).await;
                    info!(scan_id = %scan_id, outcome = outcome.kind(), "scan settled");
                    drop(permit);
                    outcome
                }),
            ));
        }

        let mut panicked = Vec::new();
        for (index, worker) in workers {
            match worker.await {
                Ok(outcome) => slots[index] = Some(outcome),
                Err(err) => {
                    error!(scan_id = %scan_ids[index], error = %err, "archive worker did not complete");
                    panicked.push(scan_ids[index].clone());
                }
            }
        }

        if !panicked.is_empty() {
            return Err(CoreError::WorkerPanicked { scan_ids: panicked });
        }

        Ok(scan_ids
            .into_iter()
            .zip(slots)
            .map(|(scan_id, slot)| ScanOutcome {
                scan_id,
                outcome: slot.unwrap_or(TaskOutcome::Skipped),
            })
            .collect())
    }
}
