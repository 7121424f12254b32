//! Repository for the singleton user profile.
//!
//! The profile lives under one fixed store key. It does not exist until the
//! first successful save, and every save replaces the whole record.

use crate::models::UserProfile;
use crate::storage::{KeyValueStore, PROFILE_KEY};
use crate::validation::validate_profile;
use crate::{Error, Result};
use tracing::{debug, error, info, warn};

/// Owns the stored [`UserProfile`].
pub struct ProfileRepository<S> {
    store: S,
}

impl<S: KeyValueStore> ProfileRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the stored profile.
    ///
    /// Returns `Ok(None)` when no profile was ever saved. A corrupt record is
    /// logged and also reads as `None`; use [`load_checked`](Self::load_checked)
    /// to tell the two apart.
    pub async fn load(&self) -> Result<Option<UserProfile>> {
        match self.load_checked().await {
            Err(Error::CorruptData { .. }) => Ok(None),
            other => other,
        }
    }

    /// Like [`load`](Self::load), but a value that is present and does not
    /// decode as a profile object is [`Error::CorruptData`].
    pub async fn load_checked(&self) -> Result<Option<UserProfile>> {
        let Some(raw) = self.store.get(PROFILE_KEY).await? else {
            debug!(key = PROFILE_KEY, "no profile stored");
            return Ok(None);
        };

        match decode_profile(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(source) => {
                warn!(key = PROFILE_KEY, error = %source, "stored profile is corrupt");
                Err(Error::CorruptData {
                    key: PROFILE_KEY.to_string(),
                    source,
                })
            }
        }
    }

    /// Check whether a loadable profile is stored.
    ///
    /// A corrupt record counts as no profile.
    pub async fn exists(&self) -> Result<bool> {
        Ok(self.load().await?.is_some())
    }

    /// Validate and store `profile`, replacing any previous record.
    ///
    /// Validation runs before the store is touched, so a rejected profile
    /// leaves the stored one unchanged.
    pub async fn save(&self, profile: &UserProfile) -> Result<()> {
        if let Err(e) = validate_profile(profile) {
            info!(error = %e, "profile rejected by validation");
            return Err(e.into());
        }

        let serialized = serde_json::to_string(profile)?;
        if let Err(e) = self.store.set(PROFILE_KEY, &serialized).await {
            error!(key = PROFILE_KEY, error = %e, "failed to write profile");
            return Err(e.into());
        }

        debug!(key = PROFILE_KEY, "profile saved");
        Ok(())
    }
}

/// Decode a stored record. Only a JSON object is a profile; absent keys read
/// as empty strings.
fn decode_profile(raw: &str) -> serde_json::Result<UserProfile> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        value @ serde_json::Value::Object(_) => serde_json::from_value(value),
        _ => Err(<serde_json::Error as serde::de::Error>::custom(
            "stored profile is not a JSON object",
        )),
    }
}
