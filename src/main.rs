//! Consulta CLI - Medical appointment booking from the terminal.

use chrono::{Local, NaiveDate};
use clap::Parser;
use consulta::cli::{
    AppointmentCommands, Cli, Commands, ConfigCommands, ProfileCommands, SettingsCommands,
};
use consulta::commands::{self, AnyApp, App, Output};
use consulta::config::{ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config};
use consulta::models::{AppointmentRequest, UserProfile};
use consulta::splash::SplashTimings;
use consulta::storage::open_store;
use consulta::{Error, logging};
use std::future::Future;
use std::pin::Pin;
use std::process;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

fn main() {
    let cli = Cli::parse();

    let mut overrides = ConfigOverrides::new();
    if let Some(backend) = cli.backend {
        overrides = overrides.with_backend(backend);
    }
    if let Some(ref dir) = cli.data_dir {
        overrides = overrides.with_data_dir(dir);
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }

    let config = match resolve_config(&overrides) {
        Ok(config) => config,
        Err(e) => exit_with_error(&e, cli.human_readable),
    };
    let human = config.output_format() == OutputFormat::Human;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = match logging::init(config.log_level(), config.log_file()) {
        Ok(guard) => guard,
        Err(e) => exit_with_error(&e, human),
    };
    for warning in &config.warnings {
        tracing::warn!("config: {}", warning);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => exit_with_error(&e.into(), human),
    };

    if let Err(e) = runtime.block_on(run_command(cli.command, &config, human)) {
        exit_with_error(&e, human);
    }
}

/// Print an error the way the output format asks for, then exit 1.
fn exit_with_error(error: &Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", error);
        if let Error::Validation(v) = error {
            eprintln!("{}", v.user_message());
        }
        if let Error::NoProfile = error {
            eprintln!("Create one with `consulta profile create`.");
        }
    } else {
        let mut err = serde_json::json!({
            "error": error.to_string(),
            "kind": error.kind(),
        });
        if let Error::Validation(v) = error {
            err["message"] = v.user_message().into();
            if !v.missing_fields().is_empty() {
                err["missingFields"] = v.missing_fields().into();
            }
        }
        eprintln!("{}", err);
    }
    process::exit(1);
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

async fn run_command(
    command: Commands,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), Error> {
    match command {
        Commands::Launch {
            interactive,
            enter_after_ms,
            manual_after_ms,
            auto_after_ms,
        } => {
            let app = open_app(config)?;
            let mut timings = SplashTimings::default();
            if let Some(ms) = manual_after_ms {
                timings.manual_entry_after = Duration::from_millis(ms);
            }
            if let Some(ms) = auto_after_ms {
                timings.auto_advance_after = Duration::from_millis(ms);
            }
            let manual: Pin<Box<dyn Future<Output = ()>>> = match (interactive, enter_after_ms) {
                (true, _) => Box::pin(wait_for_enter()),
                // Created on first poll, so the delay counts from when the button appears
                (false, Some(ms)) => Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(ms)).await
                }),
                (false, None) => Box::pin(std::future::pending::<()>()),
            };
            if human && interactive {
                eprintln!("Press Enter to continue once the button appears...");
            }
            let result = commands::launch(&app, timings, manual).await?;
            output(&result, human);
        }

        Commands::Profile { command } => {
            let app = open_app(config)?;
            match command {
                ProfileCommands::Show => {
                    let result = commands::profile_show(&app).await?;
                    output(&result, human);
                }
                ProfileCommands::Exists => {
                    let result = commands::profile_exists(&app).await?;
                    output(&result, human);
                }
                ProfileCommands::Create {
                    name,
                    email,
                    phone,
                    cpf,
                    birth_date,
                    address,
                    emergency_contact,
                } => {
                    let profile = UserProfile::new(name, email, phone, cpf)
                        .with_birth_date(birth_date)
                        .with_address(address)
                        .with_emergency_contact(emergency_contact);
                    let result = commands::profile_create(&app, profile).await?;
                    output(&result, human);
                }
                ProfileCommands::Edit { set, discard } => {
                    let changes = set
                        .iter()
                        .map(|raw| commands::parse_assignment(raw))
                        .collect::<Result<Vec<_>, _>>()?;
                    let result = commands::profile_edit(&app, &changes, discard).await?;
                    output(&result, human);
                }
            }
        }

        Commands::Settings { command } => {
            let app = open_app(config)?;
            match command {
                SettingsCommands::Show => {
                    let result = commands::settings_show(&app).await?;
                    output(&result, human);
                }
                SettingsCommands::Get { key } => {
                    let result = commands::settings_get(&app, key).await?;
                    output(&result, human);
                }
                SettingsCommands::Set { key, value } => {
                    let result = commands::settings_set(&app, key, value).await?;
                    output(&result, human);
                }
                SettingsCommands::Reset { key } => {
                    let result = commands::settings_reset(&app, key).await?;
                    output(&result, human);
                }
            }
        }

        Commands::Appointment { command } => match command {
            AppointmentCommands::Book {
                name,
                age,
                phone,
                specialty,
                date,
                symptoms,
            } => {
                let today = Local::now().date_naive();
                let date = match date {
                    Some(raw) => parse_date(&raw)?,
                    None => today,
                };
                let request = AppointmentRequest {
                    patient_name: name,
                    patient_age: age,
                    phone_number: phone,
                    specialty,
                    date,
                    symptoms,
                };
                let result = commands::appointment_book(&request, today)?;
                output(&result, human);
            }
        },

        Commands::Doctors { specialty } => {
            output(&commands::doctors(specialty), human);
        }

        Commands::Specialties => {
            output(&commands::specialties(), human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                output(&commands::config_show(config), human);
            }
            ConfigCommands::Init { force } => {
                let result = commands::config_init(config, force)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

fn open_app(config: &ResolvedConfig) -> Result<AnyApp, Error> {
    let store = open_store(config.backend(), config.data_dir())?;
    Ok(App::new(store))
}

/// Accept dd/mm/yyyy (as shown in the app) or ISO yyyy-mm-dd.
fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| {
            Error::InvalidInput(format!(
                "invalid date '{}' (expected dd/mm/yyyy or yyyy-mm-dd)",
                raw
            ))
        })
}

/// Resolves when a line (or EOF) is read from stdin.
async fn wait_for_enter() {
    let mut line = String::new();
    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());
    if let Err(e) = stdin.read_line(&mut line).await {
        tracing::debug!(error = %e, "stdin closed while waiting for enter");
    }
}
