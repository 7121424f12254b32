//! Launch flow shown before the home screen.
//!
//! The splash picks its theme from the stored `darkMode` flag, offers a
//! manual "enter" action after [`MANUAL_ENTRY_AFTER`], and advances on its
//! own after [`AUTO_ADVANCE_AFTER`]. Whichever happens first wins.

use crate::settings::{SettingKey, SettingsRepository};
use crate::storage::KeyValueStore;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// Delay before the manual entry action is offered.
pub const MANUAL_ENTRY_AFTER: Duration = Duration::from_secs(2);

/// Delay after which the splash advances without user action.
pub const AUTO_ADVANCE_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashTimings {
    pub manual_entry_after: Duration,
    pub auto_advance_after: Duration,
}

impl Default for SplashTimings {
    fn default() -> Self {
        Self {
            manual_entry_after: MANUAL_ENTRY_AFTER,
            auto_advance_after: AUTO_ADVANCE_AFTER,
        }
    }
}

/// How the splash was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplashOutcome {
    pub theme: Theme,
    pub entry: Entry,
    pub elapsed_ms: u64,
}

/// Theme for the splash. An unreadable store falls back to light.
pub async fn load_theme<S: KeyValueStore>(settings: &SettingsRepository<S>) -> Theme {
    match settings.load_flag(SettingKey::DarkMode, false).await {
        Ok(true) => Theme::Dark,
        Ok(false) => Theme::Light,
        Err(e) => {
            warn!(error = %e, "could not load dark mode preference");
            Theme::Light
        }
    }
}

/// Wait for the first of auto-advance or manual entry.
///
/// `manual` is only polled once the manual action is on offer; an entry it
/// signals earlier takes effect the moment the action appears. If both are
/// ready at the same instant, manual entry wins.
pub async fn await_entry<F>(timings: SplashTimings, manual: F) -> Entry
where
    F: Future<Output = ()>,
{
    let manual = async move {
        sleep(timings.manual_entry_after).await;
        debug!("manual entry offered");
        manual.await;
    };

    tokio::select! {
        biased;
        _ = manual => Entry::Manual,
        _ = sleep(timings.auto_advance_after) => Entry::Automatic,
    }
}

/// Run the whole splash: load the theme, then wait for entry.
pub async fn run<S, F>(
    settings: &SettingsRepository<S>,
    timings: SplashTimings,
    manual: F,
) -> SplashOutcome
where
    S: KeyValueStore,
    F: Future<Output = ()>,
{
    let started = Instant::now();
    let theme = load_theme(settings).await;
    let entry = await_entry(timings, manual).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    debug!(?theme, ?entry, elapsed_ms, "splash finished");
    SplashOutcome {
        theme,
        entry,
        elapsed_ms,
    }
}
