//! consulta - local persistence for a medical appointment booking app.
//!
//! This library provides the core functionality for the `consulta` CLI,
//! including the user profile and settings repositories, the profile edit
//! session, and appointment request validation.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod profile;
pub mod session;
pub mod settings;
pub mod splash;
pub mod storage;
pub mod validation;

pub use profile::ProfileRepository;
pub use session::{EditSession, SessionMode};
pub use settings::{AppSettings, SettingKey, SettingsRepository};
pub use validation::ValidationError;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::storage::{FileStore, MemoryStore, SqliteStore, file_store_dir, sqlite_store_path};
    use crate::{ProfileRepository, SettingsRepository};

    /// Test environment with an isolated data directory.
    ///
    /// For **repository tests**: use `memory_repos()` for fast in-process stores
    /// with fault injection, or `file_store()`/`sqlite_store()` for durable ones.
    pub struct TestEnv {
        /// Isolated data storage directory
        pub data_dir: TempDir,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        pub fn file_store(&self) -> FileStore {
            FileStore::new(file_store_dir(self.data_path()))
        }

        pub fn sqlite_store(&self) -> SqliteStore {
            SqliteStore::open(&sqlite_store_path(self.data_path())).unwrap()
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    /// A shared memory store plus both repositories on top of it.
    pub fn memory_repos() -> (
        Arc<MemoryStore>,
        ProfileRepository<Arc<MemoryStore>>,
        SettingsRepository<Arc<MemoryStore>>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let profiles = ProfileRepository::new(Arc::clone(&store));
        let settings = SettingsRepository::new(Arc::clone(&store));
        (store, profiles, settings)
    }
}

/// Library-level error type for consulta operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StoreError),

    #[error("Stored data under '{key}' is corrupt: {source}")]
    CorruptData {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No profile exists yet: create one first")]
    NoProfile,

    #[error("Cannot {operation} while {mode}")]
    IllegalTransition {
        operation: &'static str,
        mode: SessionMode,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short taxonomy name used in machine-readable output.
    ///
    /// No kind is fatal: every error is returned to the caller, which decides
    /// how to present it.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Storage(_) => "storage",
            Error::CorruptData { .. } => "corrupt_data",
            Error::NoProfile | Error::IllegalTransition { .. } => "precondition",
            Error::UnknownField(_) | Error::InvalidInput(_) => "input",
            Error::Config(_) => "config",
            Error::Io(_) | Error::Json(_) => "io",
        }
    }
}

/// Result type alias for consulta operations.
pub type Result<T> = std::result::Result<T, Error>;
