//! File-per-key store backend.
//!
//! Each key is stored as `<root>/<key>.json`. Writes go to a temporary file in
//! the same directory which is then renamed over the target, so a reader never
//! observes a half-written value.

use super::backend::{BackendType, KeyValueStore, StoreResult, validate_key};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Store that keeps every key in its own file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory holding the key files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let root = self.root.clone();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            std::fs::create_dir_all(&root)?;
            let mut tmp = NamedTempFile::new_in(&root)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await?
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("store"));
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let (_dir, store) = create_test_store();
        assert_eq!(store.get("userProfile").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_file() {
        let (_dir, store) = create_test_store();
        store.set("darkMode", "true").await.unwrap();

        let on_disk = std::fs::read_to_string(store.root().join("darkMode.json")).unwrap();
        assert_eq!(on_disk, "true");
        assert_eq!(store.get("darkMode").await.unwrap().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let (_dir, store) = create_test_store();
        store.set("notifications", "true").await.unwrap();
        store.set("notifications", "false").await.unwrap();
        assert_eq!(
            store.get("notifications").await.unwrap().as_deref(),
            Some("false")
        );

        // No temp files left behind
        let entries: Vec<_> = std::fs::read_dir(store.root()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (_dir, store) = create_test_store();
        store.set("darkMode", "true").await.unwrap();
        store.remove("darkMode").await.unwrap();
        store.remove("darkMode").await.unwrap();
        assert_eq!(store.get("darkMode").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let (_dir, store) = create_test_store();
        let err = store.set("../escape", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
