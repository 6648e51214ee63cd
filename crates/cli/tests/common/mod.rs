//! Shared test utilities for envkit CLI integration tests.
//!
//! Invariants / Assumptions:
//! - Every command runs inside its own temporary directory, so a developer's
//!   `.env` files never leak into a test.
//! - Variables that steer loading are cleared from the inherited environment.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

/// Returns a hermetic `envkit` command running in `dir`.
pub fn envkit_cmd(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("envkit");
    cmd.current_dir(dir)
        .env_remove("DOTENV_DISABLED")
        .env_remove("APP_ENV")
        .env_remove("ENVKIT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// A temporary project directory holding dotenv and secret files.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn write(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.dir.path().join(name), contents).expect("write fixture");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cmd(&self) -> Command {
        envkit_cmd(self.path())
    }
}
