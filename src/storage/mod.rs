//! Storage layer for consulta data.
//!
//! This module handles persistence of the user profile and app settings.
//!
//! ## Store Backends
//!
//! consulta supports multiple store backends behind one [`KeyValueStore`] trait:
//!
//! - **File backend** (default): One file per key at `<data-dir>/store/<key>.json`
//! - **SQLite backend**: A `kv` table in `<data-dir>/store.db`
//! - **Memory backend**: Process memory only, for tests and dry runs
//!
//! ## Key Layout
//!
//! Three independent keys, each holding a JSON text value:
//!
//! - `userProfile` - the singleton [`UserProfile`](crate::models::UserProfile) object
//! - `notifications` - JSON boolean
//! - `darkMode` - JSON boolean
//!
//! Nothing outside the repositories reads or writes these keys.

pub mod backend;
pub mod file;
pub mod memory;
pub mod sqlite;

pub use backend::{BackendType, KeyValueStore, StoreError, StoreResult, validate_key};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Store key holding the serialized user profile.
pub const PROFILE_KEY: &str = "userProfile";

/// Store key holding the notifications preference.
pub const NOTIFICATIONS_KEY: &str = "notifications";

/// Store key holding the dark mode preference.
pub const DARK_MODE_KEY: &str = "darkMode";

impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> impl Future<Output = StoreResult<()>> + Send {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send {
        (**self).remove(key)
    }

    fn location(&self) -> String {
        (**self).location()
    }

    fn backend_type(&self) -> BackendType {
        (**self).backend_type()
    }
}

/// A store whose backend is chosen at runtime.
pub enum AnyStore {
    File(FileStore),
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl KeyValueStore for AnyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self {
            AnyStore::File(store) => store.get(key).await,
            AnyStore::Sqlite(store) => store.get(key).await,
            AnyStore::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        match self {
            AnyStore::File(store) => store.set(key, value).await,
            AnyStore::Sqlite(store) => store.set(key, value).await,
            AnyStore::Memory(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        match self {
            AnyStore::File(store) => store.remove(key).await,
            AnyStore::Sqlite(store) => store.remove(key).await,
            AnyStore::Memory(store) => store.remove(key).await,
        }
    }

    fn location(&self) -> String {
        match self {
            AnyStore::File(store) => store.location(),
            AnyStore::Sqlite(store) => store.location(),
            AnyStore::Memory(store) => store.location(),
        }
    }

    fn backend_type(&self) -> BackendType {
        match self {
            AnyStore::File(_) => BackendType::File,
            AnyStore::Sqlite(_) => BackendType::Sqlite,
            AnyStore::Memory(_) => BackendType::Memory,
        }
    }
}

/// Open the store for `backend` under `data_dir`.
pub fn open_store(backend: BackendType, data_dir: &Path) -> Result<AnyStore> {
    let store = match backend {
        BackendType::File => AnyStore::File(FileStore::new(file_store_dir(data_dir))),
        BackendType::Sqlite => AnyStore::Sqlite(SqliteStore::open(&sqlite_store_path(data_dir))?),
        BackendType::Memory => AnyStore::Memory(MemoryStore::new()),
    };
    tracing::debug!(backend = %backend, location = %store.location(), "opened store");
    Ok(store)
}

/// Directory used by the file backend.
pub fn file_store_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("store")
}

/// Database path used by the SQLite backend.
pub fn sqlite_store_path(data_dir: &Path) -> PathBuf {
    data_dir.join("store.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[tokio::test]
    async fn test_open_store_per_backend() {
        let env = TestEnv::new();
        for backend in [BackendType::File, BackendType::Sqlite, BackendType::Memory] {
            let store = open_store(backend, env.data_path()).unwrap();
            assert_eq!(store.backend_type(), backend);

            store.set(DARK_MODE_KEY, "true").await.unwrap();
            assert_eq!(store.get(DARK_MODE_KEY).await.unwrap().as_deref(), Some("true"));
        }
    }

    #[tokio::test]
    async fn test_file_and_sqlite_persist_across_opens() {
        let env = TestEnv::new();
        for backend in [BackendType::File, BackendType::Sqlite] {
            {
                let store = open_store(backend, env.data_path()).unwrap();
                store.set(NOTIFICATIONS_KEY, "false").await.unwrap();
            }
            let store = open_store(backend, env.data_path()).unwrap();
            assert_eq!(
                store.get(NOTIFICATIONS_KEY).await.unwrap().as_deref(),
                Some("false"),
                "backend {} lost its value",
                backend
            );
        }
    }

    #[tokio::test]
    async fn test_arc_store_shares_state() {
        let store = Arc::new(MemoryStore::new());
        let shared = Arc::clone(&store);
        shared.set(PROFILE_KEY, "{}").await.unwrap();
        assert_eq!(store.get(PROFILE_KEY).await.unwrap().as_deref(), Some("{}"));
        assert_eq!(shared.backend_type(), BackendType::Memory);
    }
}
