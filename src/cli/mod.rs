//! CLI argument definitions for consulta.

use crate::models::Specialty;
use crate::settings::SettingKey;
use crate::storage::BackendType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CONSULTA_GIT_COMMIT"),
    ", built ",
    env!("CONSULTA_BUILD_TIMESTAMP"),
    ")"
);

/// Consulta - Medical appointment booking from the terminal.
///
/// Start with `consulta launch`, then `consulta profile create`.
#[derive(Parser, Debug)]
#[command(name = "consulta")]
#[command(author, version, long_version = LONG_VERSION, about = "Book medical appointments and manage your patient profile", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Store backend: file, sqlite or memory.
    /// Can also be set via CONSULTA_BACKEND or config.kdl.
    #[arg(long, global = true, value_parser = parse_backend)]
    pub backend: Option<BackendType>,

    /// Directory holding the store.
    /// Can also be set via CONSULTA_DATA_DIR or config.kdl.
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

fn parse_backend(s: &str) -> Result<BackendType, String> {
    BackendType::parse(s).ok_or_else(|| {
        format!(
            "unknown backend '{}' (expected file, sqlite or memory)",
            s
        )
    })
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the splash screen and enter the app
    ///
    /// The enter button appears after 2 seconds; the app enters on its own
    /// after 5 seconds.
    Launch {
        /// Wait for Enter on stdin once the enter button appears
        #[arg(long, conflicts_with = "enter_after_ms")]
        interactive: bool,

        /// Press the enter button this many milliseconds after it appears
        #[arg(long)]
        enter_after_ms: Option<u64>,

        /// Override when the enter button appears
        #[arg(long, hide = true)]
        manual_after_ms: Option<u64>,

        /// Override when the app enters on its own
        #[arg(long, hide = true)]
        auto_after_ms: Option<u64>,
    },

    /// Patient profile commands
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Preference toggles
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Appointment booking
    Appointment {
        #[command(subcommand)]
        command: AppointmentCommands,
    },

    /// List doctors, optionally for one specialty
    Doctors {
        /// Specialty name or slug (e.g. "cardiologia", "clinico-geral")
        #[arg(short, long)]
        specialty: Option<Specialty>,
    },

    /// List the specialties appointments can be booked for
    Specialties,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the stored profile
    Show,

    /// Report whether a profile is stored
    Exists,

    /// Create the profile, replacing any existing one
    Create {
        /// Full name (required)
        #[arg(long, default_value = "")]
        name: String,

        /// Email (required)
        #[arg(long, default_value = "")]
        email: String,

        /// Phone (required)
        #[arg(long, default_value = "")]
        phone: String,

        /// CPF (required)
        #[arg(long, default_value = "")]
        cpf: String,

        /// Birth date, free text
        #[arg(long = "birth-date", default_value = "")]
        birth_date: String,

        /// Address
        #[arg(long, default_value = "")]
        address: String,

        /// Emergency contact
        #[arg(long = "emergency-contact", default_value = "")]
        emergency_contact: String,
    },

    /// Edit the stored profile
    ///
    /// Changes are applied to a draft and saved only if the required fields
    /// are still filled in.
    Edit {
        /// Field assignment, e.g. --set name="Ana Silva" (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Throw the changes away instead of saving them
        #[arg(long)]
        discard: bool,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show every setting
    Show,

    /// Read one setting
    Get {
        /// notifications or darkMode
        key: SettingKey,
    },

    /// Change one setting
    Set {
        /// notifications or darkMode
        key: SettingKey,

        /// on/off, true/false
        #[arg(value_parser = parse_toggle, action = clap::ArgAction::Set)]
        value: bool,
    },

    /// Forget a setting so it reads as its default again
    Reset {
        /// notifications or darkMode
        key: SettingKey,
    },
}

fn parse_toggle(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", s)),
    }
}

/// Appointment subcommands
#[derive(Subcommand, Debug)]
pub enum AppointmentCommands {
    /// Submit an appointment request
    Book {
        /// Patient name (required)
        #[arg(long, default_value = "")]
        name: String,

        /// Patient age (required)
        #[arg(long, default_value = "")]
        age: String,

        /// Contact phone (required)
        #[arg(long, default_value = "")]
        phone: String,

        /// Specialty name or slug (required)
        #[arg(long)]
        specialty: Option<Specialty>,

        /// Appointment date, dd/mm/yyyy or yyyy-mm-dd (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Symptoms or reason for the visit
        #[arg(long, default_value = "")]
        symptoms: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and where each value came from
    Show,

    /// Write a config.kdl with the current effective values
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "consulta",
            "-H",
            "--backend",
            "sqlite",
            "--data-dir",
            "/tmp/x",
            "specialties",
        ])
        .unwrap();
        assert!(cli.human_readable);
        assert_eq!(cli.backend, Some(BackendType::Sqlite));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Commands::Specialties));
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["consulta", "--backend", "cloud", "specialties"]).is_err());
    }

    #[test]
    fn test_settings_set_parses_toggle() {
        let cli = Cli::try_parse_from(["consulta", "settings", "set", "darkMode", "on"]).unwrap();
        match cli.command {
            Commands::Settings {
                command: SettingsCommands::Set { key, value },
            } => {
                assert_eq!(key, SettingKey::DarkMode);
                assert!(value);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_settings_set_accepts_off_and_rejects_garbage() {
        let cli =
            Cli::try_parse_from(["consulta", "settings", "set", "notifications", "off"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Settings {
                command: SettingsCommands::Set {
                    key: SettingKey::Notifications,
                    value: false
                }
            }
        ));
        assert!(
            Cli::try_parse_from(["consulta", "settings", "set", "darkMode", "sometimes"]).is_err()
        );
        assert!(Cli::try_parse_from(["consulta", "settings", "set", "darkMode"]).is_err());
    }

    #[test]
    fn test_command_tree_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_profile_edit_collects_assignments() {
        let cli = Cli::try_parse_from([
            "consulta",
            "profile",
            "edit",
            "--set",
            "name=Ana Silva",
            "--set",
            "cpf=",
        ])
        .unwrap();
        match cli.command {
            Commands::Profile {
                command: ProfileCommands::Edit { set, discard },
            } => {
                assert_eq!(set, vec!["name=Ana Silva", "cpf="]);
                assert!(!discard);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_doctors_specialty_by_slug() {
        let cli = Cli::try_parse_from(["consulta", "doctors", "-s", "cardiologia"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Doctors {
                specialty: Some(Specialty::Cardiologia)
            }
        ));
    }
}
