//! Key-value store trait and backend selection.
//!
//! This module provides the contract every store backend implements:
//! - `FileStore` - One file per key under a data directory (default)
//! - `SqliteStore` - A single `kv` table in a SQLite database
//! - `MemoryStore` - In-process map, used for tests and throwaway runs

use serde::{Deserialize, Serialize};
use std::future::Future;

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Unavailable(format!("store task failed: {}", err))
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Trait for durable, string-keyed text storage.
///
/// Every operation suspends the caller until the backend responds. Values are
/// opaque text; callers own serialization. There is no batch or multi-key
/// transaction: each call touches exactly one key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key was never set.
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Store `value` under `key`, replacing any previous value in one operation.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type.
    fn backend_type(&self) -> BackendType;
}

/// Available store backend types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// One file per key - <data-dir>/store/<key>.json
    #[default]
    File,
    /// SQLite database - <data-dir>/store.db
    Sqlite,
    /// Process memory, nothing survives exit
    Memory,
}

impl BackendType {
    /// Parse a backend type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" | "files" | "default" => Some(Self::File),
            "sqlite" | "db" => Some(Self::Sqlite),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check that a key is usable by every backend.
///
/// Keys double as file names for `FileStore`, so only ASCII letters, digits,
/// `-`, `_` and `.` are accepted, and the key may not start with a dot.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_parse() {
        assert_eq!(BackendType::parse("file"), Some(BackendType::File));
        assert_eq!(BackendType::parse("SQLite"), Some(BackendType::Sqlite));
        assert_eq!(BackendType::parse("mem"), Some(BackendType::Memory));
        assert_eq!(BackendType::parse("cloud"), None);
    }

    #[test]
    fn test_backend_type_display_round_trips() {
        for backend in [BackendType::File, BackendType::Sqlite, BackendType::Memory] {
            assert_eq!(BackendType::parse(&backend.to_string()), Some(backend));
        }
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("userProfile").is_ok());
        assert!(validate_key("dark_mode-2.v1").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
    }
}
