//! Common test utilities for consulta integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's real data or config directories.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates two temporary directories:
/// - `data_dir`: Holds the store (via `CONSULTA_DATA_DIR`)
/// - `config_dir`: Holds config.kdl (via `CONSULTA_CONFIG`)
///
/// The `consulta()` method sets both per-invocation, making tests
/// parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment with a saved profile.
    pub fn with_profile() -> Self {
        let env = Self::new();
        env.consulta()
            .args([
                "profile",
                "create",
                "--name",
                "Ana",
                "--email",
                "a@x.com",
                "--phone",
                "1199999999",
                "--cpf",
                "11122233344",
            ])
            .assert()
            .success();
        env
    }

    /// Get a Command for the consulta binary with isolated directories.
    pub fn consulta(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_consulta"));
        cmd.env("CONSULTA_DATA_DIR", self.data_dir.path());
        cmd.env("CONSULTA_CONFIG", self.config_path());
        cmd.env_remove("CONSULTA_BACKEND");
        cmd.env_remove("CONSULTA_LOG");
        cmd
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Get the path config.kdl is read from.
    pub fn config_path(&self) -> std::path::PathBuf {
        self.config_dir.path().join("config.kdl")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}
