//! Local directory store used for `file://` destinations.
//!
//! # Design
//! - Objects are written to a uniquely named sibling file and renamed into
//!   place, so readers never observe a partially written report.
//! - Keys must be relative paths made of plain components.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use scanvault_core::{ArchiveKey, ObjectStore, RemoteError};

use crate::error::{StorageError, StorageResult};

const OP_PUT: &str = "filesystem put";

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory when needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created.
    pub async fn create(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|source| StorageError::Io {
                operation: "create archive root",
                path: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    /// Directory objects are written under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the object stored under `key`, if the key is a safe relative path.
    #[must_use]
    pub fn path_for(&self, key: &ArchiveKey) -> Option<PathBuf> {
        let relative = Path::new(key.as_str());
        relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        key: &ArchiveKey,
        body: Vec<u8>,
        _content_type: &'static str,
    ) -> Result<(), RemoteError> {
        let target = self.path_for(key).ok_or_else(|| RemoteError::Payload {
            operation: OP_PUT,
            detail: format!("key {key} escapes the archive root"),
        })?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| RemoteError::io(OP_PUT, &err))?;
        }

        let mut staging = target.clone().into_os_string();
        staging.push(format!(".{}.partial", Uuid::new_v4().simple()));
        let staging = PathBuf::from(staging);

        discard_on_error(&staging, fs::write(&staging, &body).await).await?;
        discard_on_error(&staging, fs::rename(&staging, &target).await).await?;
        debug!(path = %target.display(), bytes = body.len(), "report written");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }
}

/// Remove a staging file left behind by a failed write or rename.
async fn discard_on_error<T>(staging: &Path, result: io::Result<T>) -> Result<T, RemoteError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            let _ = fs::remove_file(staging).await;
            Err(RemoteError::io(OP_PUT, &err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanvault_core::{JSON_CONTENT_TYPE, ScanId};

    #[tokio::test]
    async fn put_writes_and_overwrites() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsObjectStore::create(dir.path()).await?;
        let key = ArchiveKey::for_scan(&ScanId::from("40012"), None);

        store.put(&key, b"{\"v\":1}".to_vec(), JSON_CONTENT_TYPE).await?;
        store.put(&key, b"{\"v\":2}".to_vec(), JSON_CONTENT_TYPE).await?;

        let stored = tokio::fs::read(dir.path().join("40012.json")).await?;
        assert_eq!(stored, b"{\"v\":2}");
        let mut entries = tokio::fs::read_dir(dir.path()).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        assert_eq!(names, ["40012.json"]);
        Ok(())
    }

    #[tokio::test]
    async fn prefixed_keys_create_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsObjectStore::create(dir.path().join("archive")).await?;
        let key = ArchiveKey::for_scan(&ScanId::from("7"), Some("qualys/was"));

        store.put(&key, b"{}".to_vec(), JSON_CONTENT_TYPE).await?;

        assert!(dir.path().join("archive/qualys/was/7.json").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsObjectStore::create(dir.path()).await?;
        let key = ArchiveKey::for_scan(&ScanId::from("7"), Some("../outside"));

        let err = store
            .put(&key, b"{}".to_vec(), JSON_CONTENT_TYPE)
            .await
            .expect_err("escaping key");
        assert!(matches!(err, RemoteError::Payload { .. }));
        assert!(!err.is_retryable());
        Ok(())
    }

    async fn leftover_names(dir: &Path) -> anyhow::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    #[tokio::test]
    async fn failed_write_removes_staging_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let staging = dir.path().join("9.json.abc.partial");
        tokio::fs::write(&staging, b"{\"trunc").await?;

        let err = discard_on_error::<()>(
            &staging,
            Err(io::Error::new(io::ErrorKind::StorageFull, "no space left")),
        )
        .await
        .expect_err("write failure");

        assert!(matches!(err, RemoteError::Io { .. }));
        assert!(leftover_names(dir.path()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_partial_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsObjectStore::create(dir.path()).await?;
        let key = ArchiveKey::for_scan(&ScanId::from("9"), None);
        tokio::fs::create_dir(dir.path().join("9.json")).await?;
        tokio::fs::write(dir.path().join("9.json/occupied"), b"x").await?;

        let err = store
            .put(&key, b"{}".to_vec(), JSON_CONTENT_TYPE)
            .await
            .expect_err("target is a directory");

        assert!(matches!(err, RemoteError::Io { .. }));
        assert_eq!(leftover_names(dir.path()).await?, ["9.json"]);
        Ok(())
    }

    #[tokio::test]
    async fn describe_names_the_root() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsObjectStore::create(dir.path()).await?;
        assert_eq!(store.describe(), format!("file://{}", dir.path().display()));
        Ok(())
    }
}
