#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Orchestration core for the daily scan archive run.
//!
//! Layout: `model.rs` (identifiers, keys, outcomes), `service.rs` (collaborator
//! traits), `backoff.rs` (retry policy), `enumerator.rs` (work set), `task.rs`
//! (fetch-and-archive unit), `coordinator.rs` (bounded worker pool), `report.rs`
//! (run summary), `pipeline.rs` (end-to-end run).

pub mod backoff;
pub mod coordinator;
pub mod enumerator;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod service;
pub mod task;

pub use backoff::{BackoffPolicy, RetryFailure};
pub use coordinator::Coordinator;
pub use enumerator::WorkEnumerator;
pub use error::{CoreError, CoreResult, RemoteError};
pub use model::{
    ArchiveKey, Criterion, JSON_CONTENT_TYPE, ScanId, ScanListingQuery, ScanOutcome, ScanReport,
    TaskOutcome,
};
pub use pipeline::ArchivePipeline;
pub use report::{FailedScan, RunSummary};
pub use service::{ObjectStore, ReportSource, ScanListing};
pub use task::ArchiveTask;
