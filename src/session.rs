//! Edit session for the profile screen.
//!
//! A session is either viewing the committed profile or editing a draft copy
//! of it:
//!
//! ```text
//!              begin_edit
//!   Viewing(c) ──────────▶ Editing(c, clone(c))
//!       ▲                    │  mutate_field: draft only
//!       │  discard           │
//!       ├────────────────────┤
//!       │  commit ok         │  commit failed: stays Editing, draft kept
//!   Viewing(draft) ◀─────────┘
//! ```
//!
//! The session is an owned value. The screen creates it when it mounts,
//! passes the repository in explicitly on `commit`, and disposes of it on
//! teardown. Two sessions over the same repository are not coordinated: the
//! last successful commit wins.

use crate::models::{ProfileField, UserProfile};
use crate::profile::ProfileRepository;
use crate::storage::KeyValueStore;
use crate::validation::validate_profile;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Which of the two states a session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Viewing,
    Editing,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Viewing => write!(f, "viewing"),
            SessionMode::Editing => write!(f, "editing"),
        }
    }
}

#[derive(Debug, Clone)]
enum State {
    /// `committed` is `None` when no profile exists yet.
    Viewing { committed: Option<UserProfile> },
    /// Editing always starts from an existing profile.
    Editing {
        committed: UserProfile,
        draft: UserProfile,
    },
}

/// Draft/commit state machine over the stored profile.
#[derive(Debug, Clone)]
pub struct EditSession {
    state: State,
}

impl EditSession {
    /// Start a session in `Viewing`, seeded from the repository.
    ///
    /// A corrupt stored profile is treated as no profile. Store read failures
    /// are returned.
    pub async fn create<S: KeyValueStore>(repo: &ProfileRepository<S>) -> Result<Self> {
        let committed = repo.load().await?;
        debug!(has_profile = committed.is_some(), "edit session created");
        Ok(Self::with_committed(committed))
    }

    /// Start a session in `Viewing` over an already loaded value.
    pub fn with_committed(committed: Option<UserProfile>) -> Self {
        Self {
            state: State::Viewing { committed },
        }
    }

    /// End the session. Any uncommitted draft is dropped.
    pub fn dispose(self) {
        if let State::Editing { .. } = self.state {
            debug!("edit session disposed with an uncommitted draft");
        } else {
            debug!("edit session disposed");
        }
    }

    pub fn mode(&self) -> SessionMode {
        match self.state {
            State::Viewing { .. } => SessionMode::Viewing,
            State::Editing { .. } => SessionMode::Editing,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.mode() == SessionMode::Editing
    }

    /// The value known to be stored, if any.
    pub fn committed(&self) -> Option<&UserProfile> {
        match &self.state {
            State::Viewing { committed } => committed.as_ref(),
            State::Editing { committed, .. } => Some(committed),
        }
    }

    /// The working copy; present only while editing.
    pub fn draft(&self) -> Option<&UserProfile> {
        match &self.state {
            State::Viewing { .. } => None,
            State::Editing { draft, .. } => Some(draft),
        }
    }

    /// True while editing and the draft differs from the committed value.
    pub fn has_changes(&self) -> bool {
        match &self.state {
            State::Viewing { .. } => false,
            State::Editing { committed, draft } => committed != draft,
        }
    }

    /// Fields where the draft differs from the committed value.
    pub fn changed_fields(&self) -> Vec<ProfileField> {
        match &self.state {
            State::Viewing { .. } => Vec::new(),
            State::Editing { committed, draft } => ProfileField::ALL
                .into_iter()
                .filter(|field| committed.get(*field) != draft.get(*field))
                .collect(),
        }
    }

    /// `Viewing(c)` → `Editing(c, clone(c))`.
    ///
    /// Fails with [`Error::NoProfile`] when nothing is committed: creating a
    /// profile is a separate flow.
    pub fn begin_edit(&mut self) -> Result<()> {
        let committed = match &self.state {
            State::Viewing {
                committed: Some(committed),
            } => committed.clone(),
            State::Viewing { committed: None } => return Err(Error::NoProfile),
            State::Editing { .. } => return Err(self.illegal("begin editing")),
        };
        let draft = committed.clone();
        self.state = State::Editing { committed, draft };
        debug!("edit session: viewing -> editing");
        Ok(())
    }

    /// Replace one field of the draft. Only valid while editing.
    pub fn mutate_field(&mut self, field: ProfileField, value: impl Into<String>) -> Result<()> {
        if let State::Editing { draft, .. } = &mut self.state {
            draft.set(field, value);
            debug!(field = %field, "edit session: draft updated");
            return Ok(());
        }
        Err(self.illegal("edit a field"))
    }

    /// Like [`mutate_field`](Self::mutate_field) with the field given by name.
    pub fn mutate_field_named(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = name
            .parse::<ProfileField>()
            .map_err(|_| Error::UnknownField(name.to_string()))?;
        self.mutate_field(field, value)
    }

    /// Validate the draft, save it, and make it the committed value.
    ///
    /// - Validation failure: nothing is written, the session stays in
    ///   `Editing` with the draft as it was, and [`Error::Validation`] is
    ///   returned.
    /// - Store failure: the session stays in `Editing` with the draft as it
    ///   was, and [`Error::Storage`] is returned so the user can retry.
    /// - Success: the draft moves into `committed` and the session returns
    ///   to `Viewing`.
    pub async fn commit<S: KeyValueStore>(&mut self, repo: &ProfileRepository<S>) -> Result<()> {
        let State::Editing { draft, .. } = &self.state else {
            return Err(self.illegal("commit"));
        };

        if let Err(e) = validate_profile(draft) {
            info!(error = %e, "edit session: commit rejected by validation");
            return Err(e.into());
        }

        repo.save(draft).await?;

        let previous = std::mem::replace(&mut self.state, State::Viewing { committed: None });
        self.state = match previous {
            State::Editing { draft, .. } => State::Viewing {
                committed: Some(draft),
            },
            other => other,
        };
        debug!("edit session: editing -> viewing (committed)");
        Ok(())
    }

    /// Drop the draft and return to viewing the committed value.
    pub fn discard(&mut self) -> Result<()> {
        let previous = std::mem::replace(&mut self.state, State::Viewing { committed: None });
        match previous {
            State::Editing { committed, .. } => {
                self.state = State::Viewing {
                    committed: Some(committed),
                };
                debug!("edit session: editing -> viewing (discarded)");
                Ok(())
            }
            viewing @ State::Viewing { .. } => {
                self.state = viewing;
                Err(self.illegal("discard"))
            }
        }
    }

    fn illegal(&self, operation: &'static str) -> Error {
        let mode = self.mode();
        warn!(operation, mode = %mode, "edit session: illegal transition");
        Error::IllegalTransition { operation, mode }
    }
}
