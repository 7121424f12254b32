//! KDL schema for config.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation functions
//! - Default values

use crate::storage::BackendType;
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verbosity of the log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// backend "sqlite"            // or "file", "memory"
/// data-dir "/var/lib/consulta"
/// log-level "info"
/// log-file "/tmp/consulta.log"
/// output-format "human"       // or "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultaConfig {
    /// Store backend
    pub backend: Option<BackendType>,

    /// Directory holding the store
    pub data_dir: Option<PathBuf>,

    /// Log verbosity
    pub log_level: Option<LogLevel>,

    /// Append logs to this file in addition to stderr
    pub log_file: Option<PathBuf>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,
}

/// Node names understood in config.kdl.
const KNOWN_NODES: [&str; 5] = ["backend", "data-dir", "log-level", "log-file", "output-format"];

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

impl ConsultaConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref dir) = self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err("data-dir must not be empty".to_string());
            }
        }
        if let Some(ref file) = self.log_file {
            if file.as_os_str().is_empty() {
                return Err("log-file must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Values that cannot be understood are skipped; see [`Self::problems`].
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            backend: first_string(doc, "backend").and_then(BackendType::parse),
            data_dir: first_string(doc, "data-dir").map(PathBuf::from),
            log_level: first_string(doc, "log-level").and_then(LogLevel::parse),
            log_file: first_string(doc, "log-file").map(PathBuf::from),
            output_format: first_string(doc, "output-format").and_then(OutputFormat::parse),
        }
    }

    /// Describe nodes in `doc` that [`Self::from_kdl`] skips.
    pub fn problems(doc: &KdlDocument) -> Vec<String> {
        let mut problems = Vec::new();
        for node in doc.nodes() {
            let name = node.name().value();
            if !KNOWN_NODES.contains(&name) {
                problems.push(format!("unknown setting '{}'", name));
                continue;
            }
            let Some(value) = node.entries().first().and_then(|e| e.value().as_string()) else {
                problems.push(format!("'{}' expects a string value", name));
                continue;
            };
            let recognized = match name {
                "backend" => BackendType::parse(value).is_some(),
                "log-level" => LogLevel::parse(value).is_some(),
                "output-format" => OutputFormat::parse(value).is_some(),
                _ => true,
            };
            if !recognized {
                problems.push(format!("invalid value '{}' for '{}'", value, name));
            }
        }
        problems
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(backend) = self.backend {
            doc.nodes_mut().push(string_node("backend", backend.as_str()));
        }
        if let Some(ref dir) = self.data_dir {
            doc.nodes_mut()
                .push(string_node("data-dir", &dir.to_string_lossy()));
        }
        if let Some(level) = self.log_level {
            doc.nodes_mut().push(string_node("log-level", level.as_str()));
        }
        if let Some(ref file) = self.log_file {
            doc.nodes_mut()
                .push(string_node("log-file", &file.to_string_lossy()));
        }
        if let Some(format) = self.output_format {
            doc.nodes_mut()
                .push(string_node("output-format", format.as_str()));
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &ConsultaConfig) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir.clone();
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file.clone();
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("human"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("xml"), None);
    }

    #[test]
    fn test_log_level_parse_and_order() {
        assert_eq!(LogLevel::parse("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!(LogLevel::Debug > LogLevel::Info);
    }

    #[test]
    fn test_config_from_kdl_empty() {
        let doc = KdlDocument::new();
        assert_eq!(ConsultaConfig::from_kdl(&doc), ConsultaConfig::default());
    }

    #[test]
    fn test_config_from_kdl_full() {
        let kdl = r#"
            backend "sqlite"
            data-dir "/var/lib/consulta"
            log-level "debug"
            log-file "/tmp/consulta.log"
            output-format "human"
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let config = ConsultaConfig::from_kdl(&doc);

        assert_eq!(config.backend, Some(BackendType::Sqlite));
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/consulta")));
        assert_eq!(config.log_level, Some(LogLevel::Debug));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/consulta.log")));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert!(ConsultaConfig::problems(&doc).is_empty());
    }

    #[test]
    fn test_config_skips_invalid_values() {
        let kdl = r#"
            backend "cloud"
            log-level "loud"
            theme "dark"
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let config = ConsultaConfig::from_kdl(&doc);
        assert_eq!(config, ConsultaConfig::default());

        let problems = ConsultaConfig::problems(&doc);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("cloud"));
        assert!(problems[2].contains("theme"));
    }

    #[test]
    fn test_config_to_kdl_roundtrip() {
        let config = ConsultaConfig {
            backend: Some(BackendType::File),
            data_dir: Some(PathBuf::from("/data")),
            log_level: Some(LogLevel::Info),
            log_file: None,
            output_format: Some(OutputFormat::Json),
        };
        let text = config.to_kdl().to_string();
        let doc: KdlDocument = text.parse().unwrap();
        assert_eq!(ConsultaConfig::from_kdl(&doc), config);
    }

    #[test]
    fn test_config_merge() {
        let mut base = ConsultaConfig {
            backend: Some(BackendType::File),
            log_level: Some(LogLevel::Warn),
            ..Default::default()
        };
        let other = ConsultaConfig {
            backend: Some(BackendType::Sqlite),
            ..Default::default()
        };
        base.merge(&other);
        assert_eq!(base.backend, Some(BackendType::Sqlite));
        assert_eq!(base.log_level, Some(LogLevel::Warn));
    }

    #[test]
    fn test_config_validate() {
        assert!(ConsultaConfig::default().validate().is_ok());
        let config = ConsultaConfig {
            data_dir: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("data-dir"));
    }
}
