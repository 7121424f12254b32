//! Repository for the boolean app preferences.
//!
//! Each flag has its own store key and is read and written on its own; no
//! operation on one flag reads, writes, or waits on the other.

use crate::storage::{DARK_MODE_KEY, KeyValueStore, NOTIFICATIONS_KEY};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, warn};

/// A persisted boolean preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    Notifications,
    DarkMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::Notifications, SettingKey::DarkMode];

    /// Store key holding this flag.
    pub fn storage_key(&self) -> &'static str {
        match self {
            SettingKey::Notifications => NOTIFICATIONS_KEY,
            SettingKey::DarkMode => DARK_MODE_KEY,
        }
    }

    /// Value used when the flag was never stored.
    pub fn default_value(&self) -> bool {
        match self {
            SettingKey::Notifications => true,
            SettingKey::DarkMode => false,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

impl std::str::FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "notifications" => Ok(SettingKey::Notifications),
            "darkMode" | "dark_mode" | "dark-mode" => Ok(SettingKey::DarkMode),
            _ => Err(format!("Unknown setting: {}", s)),
        }
    }
}

/// Snapshot of both preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub notifications: bool,
    pub dark_mode: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: SettingKey::Notifications.default_value(),
            dark_mode: SettingKey::DarkMode.default_value(),
        }
    }
}

/// Owns the stored preference flags.
pub struct SettingsRepository<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read a flag, returning `default` when it was never stored.
    ///
    /// A stored value that is not a JSON boolean is logged and also reads as
    /// `default`. Only a failing store read is an error.
    pub async fn load_flag(&self, key: SettingKey, default: bool) -> Result<bool> {
        let storage_key = key.storage_key();
        let Some(raw) = self.store.get(storage_key).await? else {
            return Ok(default);
        };

        match serde_json::from_str::<bool>(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = storage_key, error = %e, "ignoring unreadable setting");
                Ok(default)
            }
        }
    }

    /// Store a flag.
    pub async fn save_flag(&self, key: SettingKey, value: bool) -> Result<()> {
        let storage_key = key.storage_key();
        let serialized = serde_json::to_string(&value)?;
        self.store
            .set(storage_key, &serialized)
            .await
            .map_err(|e| {
                error!(key = storage_key, error = %e, "failed to write setting");
                Error::from(e)
            })?;
        debug!(key = storage_key, value, "setting saved");
        Ok(())
    }

    /// Forget a stored flag so it reads back as its default.
    pub async fn reset_flag(&self, key: SettingKey) -> Result<()> {
        self.store.remove(key.storage_key()).await?;
        debug!(key = key.storage_key(), "setting reset");
        Ok(())
    }

    /// Read both flags with their built-in defaults.
    pub async fn load_all(&self) -> Result<AppSettings> {
        Ok(AppSettings {
            notifications: self
                .load_flag(SettingKey::Notifications, SettingKey::Notifications.default_value())
                .await?,
            dark_mode: self
                .load_flag(SettingKey::DarkMode, SettingKey::DarkMode.default_value())
                .await?,
        })
    }
}
