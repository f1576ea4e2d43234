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

//! Object store backends for archived scan reports.
//!
//! Layout: `destination.rs` (destination parsing), `s3.rs` (S3 bucket),
//! `fs.rs` (local directory), `error.rs`.

pub mod destination;
pub mod error;
pub mod fs;
pub mod s3;

use std::sync::Arc;
use std::time::Duration;

use scanvault_core::ObjectStore;

pub use destination::Destination;
pub use error::{StorageError, StorageResult};
pub use fs::FsObjectStore;
pub use s3::S3ObjectStore;

/// Open the store named by `destination`.
///
/// `timeout` bounds each S3 call; it has no effect on the filesystem store.
///
/// # Errors
///
/// Returns [`StorageError::Io`] when the filesystem root cannot be created.
pub async fn open_store(
    destination: &Destination,
    timeout: Duration,
) -> StorageResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match destination {
        Destination::S3 { bucket } => Arc::new(S3ObjectStore::connect(bucket, timeout).await),
        Destination::Filesystem { root } => Arc::new(FsObjectStore::create(root).await?),
    };
    tracing::info!(destination = %store.describe(), "object store ready");
    Ok(store)
}
