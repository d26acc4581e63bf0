//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

/// Test context with temporary directory
pub struct TestContext {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("vellum.yaml");

        Self {
            temp_dir,
            config_path,
        }
    }

    /// Write the configuration file
    pub fn with_config(self, config: &str) -> Self {
        std::fs::write(&self.config_path, config).expect("Failed to write config");
        self
    }

    /// `velocity` over the fixture templates plus an `inline` writer
    pub fn with_default_config(self) -> Self {
        let config = format!(
            r#"
writers:
  velocity:
    template-base-dir: {templates}
    default-locale: en_US
  inline:
    resource-loader-enabled: true
"#,
            templates = fixtures_dir().join("templates").display()
        );
        self.with_config(&config)
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("vellum").expect("Binary not found");
        cmd.current_dir(self.path())
            .env("VELLUM_CONFIG", &self.config_path)
            .env_remove("VELLUM_WRITER")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn response_file() -> PathBuf {
    fixtures_dir().join("response.json")
}
