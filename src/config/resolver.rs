//! Unified precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`CONSULTA_BACKEND`, `CONSULTA_DATA_DIR`)
//! 3. config.kdl (`~/.config/consulta/config.kdl`, or `CONSULTA_CONFIG`)
//! 4. Built-in defaults

use crate::config::schema::{ConsultaConfig, LogLevel, OutputFormat};
use crate::storage::BackendType;
use crate::{Error, Result};
use kdl::KdlDocument;
use std::path::{Path, PathBuf};

/// Environment variable selecting the store backend.
pub const BACKEND_ENV: &str = "CONSULTA_BACKEND";

/// Environment variable selecting the data directory.
pub const DATA_DIR_ENV: &str = "CONSULTA_DATA_DIR";

/// Environment variable pointing at an alternative config.kdl.
pub const CONFIG_PATH_ENV: &str = "CONSULTA_CONFIG";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl at the given path
    ConfigFile(String),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile(path) => write!(f, "config:{}", path),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend: Resolved<BackendType>,
    pub data_dir: Resolved<PathBuf>,
    pub log_level: Resolved<LogLevel>,
    pub log_file: Option<Resolved<PathBuf>>,
    pub output_format: Resolved<OutputFormat>,
    /// The config file consulted, whether or not it existed
    pub config_path: Option<PathBuf>,
    /// Problems found in the config file (skipped values)
    pub warnings: Vec<String>,
}

impl ResolvedConfig {
    pub fn backend(&self) -> BackendType {
        self.backend.value
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir.value
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.value
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_ref().map(|r| r.value.as_path())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<BackendType>,
    pub data_dir: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Location of config.kdl: `CONSULTA_CONFIG` if set, else the user config dir.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join("consulta").join("config.kdl"))
}

/// Default data directory: `<user data dir>/consulta`.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("consulta"))
        .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
}

/// Read and parse a config.kdl document. A missing file is an empty document.
pub fn read_config_kdl(path: &Path) -> Result<KdlDocument> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .parse::<KdlDocument>()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(KdlDocument::new()),
        Err(e) => Err(e.into()),
    }
}

/// Write `config` to `path`, creating parent directories.
pub fn write_config_kdl(path: &Path, config: &ConsultaConfig) -> Result<()> {
    config.validate().map_err(Error::Config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_kdl().to_string())?;
    Ok(())
}

/// Resolve configuration from CLI overrides, the environment, and config.kdl.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let config_path = config_file_path();
    let (file_config, warnings) = match config_path {
        Some(ref path) => {
            let doc = read_config_kdl(path)?;
            let config = ConsultaConfig::from_kdl(&doc);
            config.validate().map_err(Error::Config)?;
            (config, ConsultaConfig::problems(&doc))
        }
        None => (ConsultaConfig::default(), Vec::new()),
    };

    let mut resolved = resolve_config_with(
        overrides,
        |name| std::env::var(name).ok().filter(|v| !v.is_empty()),
        &file_config,
        config_path.as_deref(),
        default_data_dir,
    )?;
    resolved.warnings = warnings;
    Ok(resolved)
}

/// Resolve configuration from explicit inputs.
///
/// `env` looks up environment variables; `default_dir` is only called when
/// no layer sets a data directory.
pub fn resolve_config_with<E, D>(
    overrides: &ConfigOverrides,
    env: E,
    file_config: &ConsultaConfig,
    config_path: Option<&Path>,
    default_dir: D,
) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<PathBuf>,
{
    let file_source = || {
        ValueSource::ConfigFile(
            config_path
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
    };

    // Resolve backend
    let backend = if let Some(backend) = overrides.backend {
        Resolved::new(backend, ValueSource::CliFlag)
    } else if let Some(raw) = env(BACKEND_ENV) {
        let backend = BackendType::parse(&raw).ok_or_else(|| {
            Error::Config(format!("{} has unknown backend '{}'", BACKEND_ENV, raw))
        })?;
        Resolved::new(backend, ValueSource::EnvVar(BACKEND_ENV.to_string()))
    } else if let Some(backend) = file_config.backend {
        Resolved::new(backend, file_source())
    } else {
        Resolved::new(BackendType::default(), ValueSource::Default)
    };

    // Resolve data_dir
    let data_dir = if let Some(ref dir) = overrides.data_dir {
        Resolved::new(dir.clone(), ValueSource::CliFlag)
    } else if let Some(dir) = env(DATA_DIR_ENV) {
        Resolved::new(PathBuf::from(dir), ValueSource::EnvVar(DATA_DIR_ENV.to_string()))
    } else if let Some(ref dir) = file_config.data_dir {
        Resolved::new(dir.clone(), file_source())
    } else {
        Resolved::new(default_dir()?, ValueSource::Default)
    };

    // Resolve log_level (no CLI flag; CONSULTA_LOG is applied by the subscriber)
    let log_level = match file_config.log_level {
        Some(level) => Resolved::new(level, file_source()),
        None => Resolved::new(LogLevel::default(), ValueSource::Default),
    };

    let log_file = file_config
        .log_file
        .as_ref()
        .map(|file| Resolved::new(file.clone(), file_source()));

    // Resolve output_format
    let output_format = if let Some(format) = overrides.output_format {
        Resolved::new(format, ValueSource::CliFlag)
    } else if let Some(format) = file_config.output_format {
        Resolved::new(format, file_source())
    } else {
        Resolved::new(OutputFormat::default(), ValueSource::Default)
    };

    Ok(ResolvedConfig {
        backend,
        data_dir,
        log_level,
        log_file,
        output_format,
        config_path: config_path.map(Path::to_path_buf),
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn fixed_default() -> Result<PathBuf> {
        Ok(PathBuf::from("/default/consulta"))
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let resolved = resolve_config_with(
            &ConfigOverrides::new(),
            no_env,
            &ConsultaConfig::default(),
            None,
            fixed_default,
        )
        .unwrap();

        assert_eq!(resolved.backend(), BackendType::File);
        assert_eq!(resolved.backend.source, ValueSource::Default);
        assert_eq!(resolved.data_dir(), Path::new("/default/consulta"));
        assert_eq!(resolved.log_level(), LogLevel::Warn);
        assert_eq!(resolved.log_file(), None);
        assert_eq!(resolved.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let file_config = ConsultaConfig {
            backend: Some(BackendType::Memory),
            data_dir: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let env = |name: &str| match name {
            BACKEND_ENV => Some("sqlite".to_string()),
            DATA_DIR_ENV => Some("/from/env".to_string()),
            _ => None,
        };

        // env over file
        let resolved = resolve_config_with(
            &ConfigOverrides::new(),
            env,
            &file_config,
            Some(Path::new("/etc/config.kdl")),
            fixed_default,
        )
        .unwrap();
        assert_eq!(resolved.backend(), BackendType::Sqlite);
        assert_eq!(
            resolved.backend.source,
            ValueSource::EnvVar(BACKEND_ENV.to_string())
        );
        assert_eq!(resolved.data_dir(), Path::new("/from/env"));

        // cli over env
        let overrides = ConfigOverrides::new()
            .with_backend(BackendType::File)
            .with_data_dir("/from/cli");
        let resolved = resolve_config_with(
            &overrides,
            env,
            &file_config,
            Some(Path::new("/etc/config.kdl")),
            fixed_default,
        )
        .unwrap();
        assert_eq!(resolved.backend(), BackendType::File);
        assert_eq!(resolved.backend.source, ValueSource::CliFlag);
        assert_eq!(resolved.data_dir(), Path::new("/from/cli"));
    }

    #[test]
    fn test_file_values_record_their_path() {
        let file_config = ConsultaConfig {
            backend: Some(BackendType::Sqlite),
            log_level: Some(LogLevel::Debug),
            log_file: Some(PathBuf::from("/tmp/consulta.log")),
            output_format: Some(OutputFormat::Human),
            ..Default::default()
        };
        let resolved = resolve_config_with(
            &ConfigOverrides::new(),
            no_env,
            &file_config,
            Some(Path::new("/home/ana/.config/consulta/config.kdl")),
            fixed_default,
        )
        .unwrap();

        assert_eq!(
            resolved.backend.source.to_string(),
            "config:/home/ana/.config/consulta/config.kdl"
        );
        assert_eq!(resolved.log_level(), LogLevel::Debug);
        assert_eq!(resolved.log_file(), Some(Path::new("/tmp/consulta.log")));
        assert_eq!(resolved.output_format(), OutputFormat::Human);
    }

    #[test]
    fn test_unknown_backend_in_env_is_config_error() {
        let env = |name: &str| (name == BACKEND_ENV).then(|| "cloud".to_string());
        let err = resolve_config_with(
            &ConfigOverrides::new(),
            env,
            &ConsultaConfig::default(),
            None,
            fixed_default,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("cloud")));
    }

    #[test]
    fn test_default_dir_not_consulted_when_dir_given() {
        let overrides = ConfigOverrides::new().with_data_dir("/explicit");
        let resolved = resolve_config_with(
            &overrides,
            no_env,
            &ConsultaConfig::default(),
            None,
            || Err(Error::Config("no home".to_string())),
        )
        .unwrap();
        assert_eq!(resolved.data_dir(), Path::new("/explicit"));
    }

    #[test]
    fn test_write_then_read_config_kdl() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.kdl");
        let config = ConsultaConfig {
            backend: Some(BackendType::Sqlite),
            log_level: Some(LogLevel::Info),
            ..Default::default()
        };

        write_config_kdl(&path, &config).unwrap();
        let doc = read_config_kdl(&path).unwrap();
        assert_eq!(ConsultaConfig::from_kdl(&doc), config);
    }

    #[test]
    fn test_missing_config_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let doc = read_config_kdl(&temp.path().join("absent.kdl")).unwrap();
        assert!(doc.nodes().is_empty());
    }

    #[test]
    fn test_malformed_config_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.kdl");
        std::fs::write(&path, "backend \"sqlite").unwrap();
        assert!(matches!(read_config_kdl(&path), Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_resolve_config_reads_env_and_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.kdl");
        std::fs::write(&config_path, "backend \"memory\"\nlog-level \"info\"\ncolour \"blue\"\n")
            .unwrap();
        let data_dir = temp.path().join("data");

        // SAFETY: serialized with every other env-mutating test via #[serial]
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &config_path);
            std::env::set_var(DATA_DIR_ENV, &data_dir);
            std::env::remove_var(BACKEND_ENV);
        }

        let resolved = resolve_config(&ConfigOverrides::new()).unwrap();

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
            std::env::remove_var(DATA_DIR_ENV);
        }

        assert_eq!(resolved.backend(), BackendType::Memory);
        assert_eq!(resolved.data_dir(), data_dir.as_path());
        assert_eq!(resolved.log_level(), LogLevel::Info);
        assert_eq!(resolved.config_path.as_deref(), Some(config_path.as_path()));
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("colour"));
    }
}
