//! In-memory collaborators with call accounting and scripted failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use scanvault_core::{
    ArchiveKey, ObjectStore, RemoteError, ReportSource, ScanId, ScanListing, ScanListingQuery,
    ScanReport,
};

use crate::fixtures::report_document;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks how many callers are inside a region at once.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyProbe {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    /// Mark entry; the region is left when the guard drops.
    #[must_use]
    pub fn enter(&self) -> ProbeGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ProbeGuard {
            current: Arc::clone(&self.current),
        }
    }

    /// Highest number of simultaneous occupants observed.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Occupants right now.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }
}

/// Guard returned by [`ConcurrencyProbe::enter`].
#[derive(Debug)]
pub struct ProbeGuard {
    current: Arc<AtomicUsize>,
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Listing service returning a fixed answer.
#[derive(Debug)]
pub struct FakeListing {
    answer: Result<Vec<ScanId>, RemoteError>,
    queries: Mutex<Vec<ScanListingQuery>>,
}

impl FakeListing {
    /// Listing that returns `scan_ids`.
    #[must_use]
    pub const fn returning(scan_ids: Vec<ScanId>) -> Self {
        Self {
            answer: Ok(scan_ids),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Listing that always fails with `error`.
    #[must_use]
    pub const fn failing(error: RemoteError) -> Self {
        Self {
            answer: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<ScanListingQuery> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl ScanListing for FakeListing {
    async fn search(&self, query: &ScanListingQuery) -> Result<Vec<ScanId>, RemoteError> {
        lock(&self.queries).push(*query);
        self.answer.clone()
    }
}

#[derive(Debug, Clone)]
enum Script {
    Fail {
        times: Option<u32>,
        error: RemoteError,
    },
    Panic,
}

/// Report source that serves [`report_document`] unless a script says otherwise.
#[derive(Debug, Default)]
pub struct FakeReports {
    scripts: Mutex<HashMap<ScanId, Script>>,
    calls: Mutex<HashMap<ScanId, u32>>,
    delay: Duration,
    probe: ConcurrencyProbe,
}

impl FakeReports {
    /// Source that answers every download immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every download open for `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Record concurrent downloads on `probe`.
    #[must_use]
    pub fn with_probe(mut self, probe: ConcurrencyProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Fail every download of `scan_id` with `error`.
    #[must_use]
    pub fn fail_always(self, scan_id: impl Into<ScanId>, error: RemoteError) -> Self {
        self.script(scan_id.into(), Script::Fail { times: None, error })
    }

    /// Fail the first `times` downloads of `scan_id` with `error`.
    #[must_use]
    pub fn fail_times(self, scan_id: impl Into<ScanId>, times: u32, error: RemoteError) -> Self {
        self.script(
            scan_id.into(),
            Script::Fail {
                times: Some(times),
                error,
            },
        )
    }

    /// Panic inside the download of `scan_id`.
    #[must_use]
    pub fn panic_on(self, scan_id: impl Into<ScanId>) -> Self {
        self.script(scan_id.into(), Script::Panic)
    }

    fn script(mut self, scan_id: ScanId, script: Script) -> Self {
        self.scripts
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scan_id, script);
        self
    }

    /// Download attempts made for `scan_id`.
    #[must_use]
    pub fn calls(&self, scan_id: &ScanId) -> u32 {
        lock(&self.calls).get(scan_id).copied().unwrap_or(0)
    }

    /// Download attempts across every identifier.
    #[must_use]
    pub fn total_calls(&self) -> u32 {
        lock(&self.calls).values().sum()
    }
}

#[async_trait]
impl ReportSource for FakeReports {
    async fn download(&self, scan_id: &ScanId) -> Result<ScanReport, RemoteError> {
        let call = {
            let mut calls = lock(&self.calls);
            let count = calls.entry(scan_id.clone()).or_default();
            *count += 1;
            *count
        };
        let _inside = self.probe.enter();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let script = lock(&self.scripts).get(scan_id).cloned();
        match script {
            Some(Script::Panic) => panic!("scripted panic while downloading scan {scan_id}"),
            Some(Script::Fail { times: None, error }) => Err(error),
            Some(Script::Fail {
                times: Some(times),
                error,
            }) if call <= times => Err(error),
            _ => Ok(ScanReport::new(report_document(scan_id))),
        }
    }
}

/// Object written to a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Stored bytes.
    pub body: Vec<u8>,
    /// Content type supplied by the writer.
    pub content_type: &'static str,
}

/// Object store keeping objects in a map, with overwrite semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: Mutex<HashMap<String, u32>>,
    failures: HashMap<String, RemoteError>,
    delay: Duration,
    probe: ConcurrencyProbe,
}

impl MemoryStore {
    /// Empty store accepting every write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every write open for `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Record concurrent writes on `probe`.
    #[must_use]
    pub fn with_probe(mut self, probe: ConcurrencyProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Reject every write to `key` with `error`.
    #[must_use]
    pub fn fail_key(mut self, key: impl Into<String>, error: RemoteError) -> Self {
        self.failures.insert(key.into(), error);
        self
    }

    /// Object stored under `key`.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        lock(&self.objects).get(key).cloned()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write attempts made for `key`, successful or not.
    #[must_use]
    pub fn put_count(&self, key: &str) -> u32 {
        lock(&self.puts).get(key).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &ArchiveKey,
        body: Vec<u8>,
        content_type: &'static str,
    ) -> Result<(), RemoteError> {
        *lock(&self.puts).entry(key.as_str().to_string()).or_default() += 1;
        let _inside = self.probe.enter();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = self.failures.get(key.as_str()) {
            return Err(error.clone());
        }
        lock(&self.objects).insert(
            key.as_str().to_string(),
            StoredObject { body, content_type },
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
