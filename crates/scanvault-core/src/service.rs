//! Collaborator traits implemented by the HTTP and storage adapters.
//!
//! Implementations must be safe to share across workers; the core holds them
//! behind `Arc<dyn ...>` and calls them concurrently.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::model::{ArchiveKey, ScanId, ScanListingQuery, ScanReport};

/// Lists scan identifiers matching a query.
#[async_trait]
pub trait ScanListing: Send + Sync {
    /// Run `query` once and return every matching identifier.
    async fn search(&self, query: &ScanListingQuery) -> Result<Vec<ScanId>, RemoteError>;
}

/// Downloads the full report for a scan.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetch the report for `scan_id`; repeating the call must be harmless.
    async fn download(&self, scan_id: &ScanId) -> Result<ScanReport, RemoteError>;
}

/// Durable object storage with overwrite semantics.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key`, replacing any existing object.
    async fn put(
        &self,
        key: &ArchiveKey,
        body: Vec<u8>,
        content_type: &'static str,
    ) -> Result<(), RemoteError>;

    /// Human-readable destination used in log lines.
    fn describe(&self) -> String;
}
