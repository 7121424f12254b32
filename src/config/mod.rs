//! Configuration for consulta.
//!
//! ## config.kdl - User preferences
//!
//! Located at `~/.config/consulta/config.kdl` (or wherever `CONSULTA_CONFIG`
//! points). Contains:
//! - `backend` - Store backend: "file", "sqlite" or "memory"
//! - `data-dir` - Directory holding the store
//! - `log-level` - "error", "warn", "info", "debug" or "trace"
//! - `log-file` - Also append logs to this file
//! - `output-format` - "json" or "human"
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config.kdl > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    BACKEND_ENV, CONFIG_PATH_ENV, ConfigOverrides, DATA_DIR_ENV, Resolved, ResolvedConfig,
    ValueSource, config_file_path, default_data_dir, read_config_kdl, resolve_config,
    resolve_config_with, write_config_kdl,
};
pub use schema::{ConsultaConfig, LogLevel, OutputFormat};
