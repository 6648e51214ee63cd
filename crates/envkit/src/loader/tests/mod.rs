//! Tests for the layered dotenv loader.
//!
//! Responsibilities:
//! - Test file selection, precedence and write-back.
//! - Test failure handling for missing, unreadable and malformed files.
//!
//! Invariants:
//! - Tests run against `MemoryEnv`, never the process environment.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::fs;

use tempfile::TempDir;

use crate::store::MemoryEnv;


/// A temporary directory of dotenv files plus an isolated environment.
pub struct Workspace {
    pub dir: TempDir,
    pub env: MemoryEnv,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            env: MemoryEnv::new(),
        }
    }

    pub fn write(&self, file: &str, content: &str) -> &Self {
        fs::write(self.dir.path().join(file), content).expect("Failed to write dotenv file");
        self
    }

    pub fn loader(&self) -> crate::loader::EnvLoader<&MemoryEnv> {
        crate::loader::EnvLoader::with_store(&self.env).with_dir(self.dir.path())
    }
}
