//! Common test utilities for cfgsync integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's real configuration directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with an isolated configuration directory.
///
/// The `cfgsync()` method returns a `Command` that sets
/// `CFGSYNC_CONFIG_DIR` per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated directory.
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the cfgsync binary with the isolated directory.
    pub fn cfgsync(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cfgsync"));
        cmd.env("CFGSYNC_CONFIG_DIR", self.config_dir.path());
        cmd
    }

    /// Get the path to the configuration directory.
    pub fn path(&self) -> &Path {
        self.config_dir.path()
    }

    /// Path of the main settings file.
    pub fn overlay_file(&self) -> PathBuf {
        self.path().join("overlay.toml")
    }

    /// Path of the search-colors file.
    pub fn colors_file(&self) -> PathBuf {
        self.path().join("search-colors.toml")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
