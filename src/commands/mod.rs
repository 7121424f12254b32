//! Command implementations for the consulta CLI.
//!
//! The CLI stands in for the app's screens: it only talks to the profile and
//! settings repositories, the edit session, and the appointment validator,
//! never to the store directly.
//!
//! Commands are organized by screen:
//! - `profile_*` - Profile screen and profile creation
//! - `settings_*` - Preference toggles
//! - `appointment_book` - Appointment form submission
//! - `doctors` / `specialties` - Catalogue listings
//! - `launch` - Splash screen

use crate::config::{ConsultaConfig, ResolvedConfig, read_config_kdl, write_config_kdl};
use crate::models::{
    AppointmentRequest, Confirmation, Doctor, ProfileField, Specialty, UserProfile, doctors_for,
};
use crate::session::EditSession;
use crate::settings::{AppSettings, SettingKey, SettingsRepository};
use crate::splash::{self, SplashOutcome, SplashTimings};
use crate::storage::{AnyStore, KeyValueStore};
use crate::validation::validate_appointment;
use crate::{Error, ProfileRepository, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Repositories shared by every command.
pub struct App<S> {
    pub profiles: ProfileRepository<Arc<S>>,
    pub settings: SettingsRepository<Arc<S>>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            profiles: ProfileRepository::new(Arc::clone(&store)),
            settings: SettingsRepository::new(store),
        }
    }
}

/// App over a runtime-selected store.
pub type AnyApp = App<AnyStore>;

fn format_profile(profile: &UserProfile) -> String {
    let mut lines = Vec::new();
    for field in ProfileField::ALL {
        let value = profile.get(field);
        let marker = if field.is_required() { "*" } else { " " };
        lines.push(format!(
            "  {}{:<17} {}",
            marker,
            field.as_str(),
            if value.is_empty() { "-" } else { value }
        ));
    }
    lines.join("\n")
}

// === Profile ===

#[derive(Debug, Serialize)]
pub struct ProfileShow {
    pub exists: bool,
    /// A stored record exists but could not be decoded
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub corrupt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

impl Output for ProfileShow {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        match &self.profile {
            Some(profile) => format!("{}\n{}", profile.display_name(), format_profile(profile)),
            None if self.corrupt => "The stored profile could not be read.\n\
                 Create a new profile with `consulta profile create`."
                .to_string(),
            None => "No profile found.\n\
                 Create one with `consulta profile create` to use every feature."
                .to_string(),
        }
    }
}

/// Show the stored profile. A corrupt record is reported as no profile.
pub async fn profile_show<S: KeyValueStore>(app: &App<S>) -> Result<ProfileShow> {
    match app.profiles.load_checked().await {
        Ok(profile) => Ok(ProfileShow {
            exists: profile.is_some(),
            corrupt: false,
            profile,
        }),
        Err(Error::CorruptData { .. }) => Ok(ProfileShow {
            exists: false,
            corrupt: true,
            profile: None,
        }),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileExists {
    pub exists: bool,
}

impl Output for ProfileExists {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.exists {
            "A profile exists.".to_string()
        } else {
            "No profile exists.".to_string()
        }
    }
}

pub async fn profile_exists<S: KeyValueStore>(app: &App<S>) -> Result<ProfileExists> {
    Ok(ProfileExists {
        exists: app.profiles.exists().await?,
    })
}

#[derive(Debug, Serialize)]
pub struct ProfileSaved {
    /// False when an existing profile was replaced
    pub created: bool,
    pub profile: UserProfile,
}

impl Output for ProfileSaved {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let verb = if self.created { "created" } else { "replaced" };
        format!(
            "Profile {} for {}.\n{}",
            verb,
            self.profile.display_name(),
            format_profile(&self.profile)
        )
    }
}

/// Create the profile from form input, replacing any existing one.
pub async fn profile_create<S: KeyValueStore>(
    app: &App<S>,
    profile: UserProfile,
) -> Result<ProfileSaved> {
    let created = !app.profiles.exists().await?;
    app.profiles.save(&profile).await?;
    Ok(ProfileSaved { created, profile })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Committed,
    Discarded,
}

#[derive(Debug, Serialize)]
pub struct ProfileEdited {
    pub outcome: EditOutcome,
    pub changed_fields: Vec<ProfileField>,
    pub profile: UserProfile,
}

impl Output for ProfileEdited {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let changed = if self.changed_fields.is_empty() {
            "no fields".to_string()
        } else {
            self.changed_fields
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self.outcome {
            EditOutcome::Committed => format!(
                "Profile updated ({}).\n{}",
                changed,
                format_profile(&self.profile)
            ),
            EditOutcome::Discarded => format!(
                "Changes to {} discarded.\n{}",
                changed,
                format_profile(&self.profile)
            ),
        }
    }
}

/// Parse a `field=value` assignment.
pub fn parse_assignment(raw: &str) -> Result<(ProfileField, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::InvalidInput(format!("expected field=value, got '{}'", raw)))?;
    let field = name
        .trim()
        .parse::<ProfileField>()
        .map_err(|_| Error::UnknownField(name.trim().to_string()))?;
    Ok((field, value.to_string()))
}

/// Run one edit session over the profile: apply `changes` to a draft, then
/// commit it (or discard it when `discard` is set).
pub async fn profile_edit<S: KeyValueStore>(
    app: &App<S>,
    changes: &[(ProfileField, String)],
    discard: bool,
) -> Result<ProfileEdited> {
    let mut session = EditSession::create(&app.profiles).await?;
    session.begin_edit()?;
    for (field, value) in changes {
        session.mutate_field(*field, value.clone())?;
    }
    let changed_fields = session.changed_fields();

    let outcome = if discard {
        session.discard()?;
        EditOutcome::Discarded
    } else {
        session.commit(&app.profiles).await?;
        EditOutcome::Committed
    };

    let profile = session.committed().cloned().ok_or(Error::NoProfile)?;
    session.dispose();
    Ok(ProfileEdited {
        outcome,
        changed_fields,
        profile,
    })
}

// === Settings ===

#[derive(Debug, Serialize)]
pub struct SettingsShow {
    #[serde(flatten)]
    pub settings: AppSettings,
}

impl Output for SettingsShow {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let on_off = |v: bool| if v { "on" } else { "off" };
        format!(
            "notifications: {}\ndarkMode:      {}",
            on_off(self.settings.notifications),
            on_off(self.settings.dark_mode)
        )
    }
}

pub async fn settings_show<S: KeyValueStore>(app: &App<S>) -> Result<SettingsShow> {
    Ok(SettingsShow {
        settings: app.settings.load_all().await?,
    })
}

#[derive(Debug, Serialize)]
pub struct SettingValue {
    pub key: SettingKey,
    pub value: bool,
}

impl Output for SettingValue {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!("{}: {}", self.key, if self.value { "on" } else { "off" })
    }
}

pub async fn settings_get<S: KeyValueStore>(app: &App<S>, key: SettingKey) -> Result<SettingValue> {
    let value = app.settings.load_flag(key, key.default_value()).await?;
    Ok(SettingValue { key, value })
}

pub async fn settings_set<S: KeyValueStore>(
    app: &App<S>,
    key: SettingKey,
    value: bool,
) -> Result<SettingValue> {
    app.settings.save_flag(key, value).await?;
    Ok(SettingValue { key, value })
}

/// Forget a stored flag and report the default it now reads as.
pub async fn settings_reset<S: KeyValueStore>(
    app: &App<S>,
    key: SettingKey,
) -> Result<SettingValue> {
    app.settings.reset_flag(key).await?;
    settings_get(app, key).await
}

// === Appointment ===

#[derive(Debug, Serialize)]
pub struct AppointmentBooked {
    #[serde(flatten)]
    pub confirmation: Confirmation,
}

impl Output for AppointmentBooked {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Consulta Agendada! ({})\n{}",
            self.confirmation.specialty, self.confirmation.message
        )
    }
}

/// Submit an appointment request. Nothing is stored.
pub fn appointment_book(request: &AppointmentRequest, today: NaiveDate) -> Result<AppointmentBooked> {
    let confirmation = validate_appointment(request, today)?;
    Ok(AppointmentBooked { confirmation })
}

// === Catalogue ===

#[derive(Debug, Serialize)]
pub struct DoctorList {
    pub count: usize,
    pub doctors: Vec<&'static Doctor>,
}

impl Output for DoctorList {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.doctors.is_empty() {
            return "No doctors available for this specialty.".to_string();
        }
        self.doctors
            .iter()
            .map(|d| {
                format!(
                    "{} [{}]\n  Experiência: {} anos | Avaliação: {:.1}\n  {}",
                    d.name, d.specialty, d.experience_years, d.rating, d.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub fn doctors(specialty: Option<Specialty>) -> DoctorList {
    let doctors = doctors_for(specialty);
    DoctorList {
        count: doctors.len(),
        doctors,
    }
}

#[derive(Debug, Serialize)]
pub struct SpecialtyList {
    pub specialties: Vec<Specialty>,
}

impl Output for SpecialtyList {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        self.specialties
            .iter()
            .map(|s| format!("{:<15} {}", s.slug(), s.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn specialties() -> SpecialtyList {
    SpecialtyList {
        specialties: Specialty::all().to_vec(),
    }
}

// === Launch ===

#[derive(Debug, Serialize)]
pub struct LaunchResult {
    #[serde(flatten)]
    pub outcome: SplashOutcome,
    pub has_profile: bool,
}

impl Output for LaunchResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let how = match self.outcome.entry {
            splash::Entry::Automatic => "automatically",
            splash::Entry::Manual => "on request",
        };
        let theme = match self.outcome.theme {
            splash::Theme::Dark => "dark",
            splash::Theme::Light => "light",
        };
        let hint = if self.has_profile {
            ""
        } else {
            "\nNo profile yet: run `consulta profile create`."
        };
        format!(
            "Marcação de Consultas ({} theme)\nEntered {} after {} ms.{}",
            theme, how, self.outcome.elapsed_ms, hint
        )
    }
}

/// Run the splash flow, then report whether a profile is ready.
pub async fn launch<S, F>(app: &App<S>, timings: SplashTimings, manual: F) -> Result<LaunchResult>
where
    S: KeyValueStore,
    F: Future<Output = ()>,
{
    let outcome = splash::run(&app.settings, timings, manual).await;
    let has_profile = app.profiles.exists().await?;
    Ok(LaunchResult {
        outcome,
        has_profile,
    })
}

// === Config ===

#[derive(Debug, Serialize)]
struct ConfigEntry {
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigShow {
    backend: ConfigEntry,
    data_dir: ConfigEntry,
    log_level: ConfigEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_file: Option<ConfigEntry>,
    output_format: ConfigEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("backend:       {} ({})", self.backend.value, self.backend.source),
            format!("data-dir:      {} ({})", self.data_dir.value, self.data_dir.source),
            format!("log-level:     {} ({})", self.log_level.value, self.log_level.source),
        ];
        if let Some(ref file) = self.log_file {
            lines.push(format!("log-file:      {} ({})", file.value, file.source));
        }
        lines.push(format!(
            "output-format: {} ({})",
            self.output_format.value, self.output_format.source
        ));
        if let Some(ref path) = self.config_path {
            lines.push(format!("config file:   {}", path));
        }
        for warning in &self.warnings {
            lines.push(format!("warning: {}", warning));
        }
        lines.join("\n")
    }
}

pub fn config_show(config: &ResolvedConfig) -> ConfigShow {
    let entry = |value: String, source: &crate::config::ValueSource| ConfigEntry {
        value,
        source: source.to_string(),
    };
    ConfigShow {
        backend: entry(config.backend().to_string(), &config.backend.source),
        data_dir: entry(
            config.data_dir().display().to_string(),
            &config.data_dir.source,
        ),
        log_level: entry(config.log_level().to_string(), &config.log_level.source),
        log_file: config
            .log_file
            .as_ref()
            .map(|r| entry(r.value.display().to_string(), &r.source)),
        output_format: entry(
            config.output_format().to_string(),
            &config.output_format.source,
        ),
        config_path: config
            .config_path
            .as_ref()
            .map(|p| p.display().to_string()),
        warnings: config.warnings.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigInit {
    pub path: String,
    /// True when an existing file was rewritten
    pub replaced: bool,
}

impl Output for ConfigInit {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.replaced {
            format!("Rewrote {}", self.path)
        } else {
            format!("Wrote {}", self.path)
        }
    }
}

/// Write the effective configuration to config.kdl.
///
/// Entries already in the file that the effective configuration does not
/// cover (such as `log-file`) are kept.
pub fn config_init(config: &ResolvedConfig, force: bool) -> Result<ConfigInit> {
    let path = config
        .config_path
        .clone()
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
    let replaced = path.exists();
    if replaced && !force {
        return Err(Error::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let mut file_config = ConsultaConfig::from_kdl(&read_config_kdl(&path)?);
    file_config.merge(&ConsultaConfig {
        backend: Some(config.backend()),
        data_dir: Some(config.data_dir().to_path_buf()),
        log_level: Some(config.log_level()),
        log_file: config.log_file().map(|p| p.to_path_buf()),
        output_format: Some(config.output_format()),
    });
    write_config_kdl(&path, &file_config)?;
    tracing::info!(path = %path.display(), "wrote config file");

    Ok(ConfigInit {
        path: path.display().to_string(),
        replaced,
    })
}
