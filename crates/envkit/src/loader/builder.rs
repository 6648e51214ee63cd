//! Layered dotenv loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `EnvLoader` (base directory, mode variable, store).
//! - Load the four layered files synchronously or concurrently on tokio.
//! - Merge by precedence, install the result in the store and return it.
//!
//! Does NOT handle:
//! - Parsing a single file (delegated to files.rs).
//!
//! Invariants / Assumptions:
//! - The mode is read from the store before any file is read.
//! - The store is replaced wholesale, once, after every read has completed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::files::{Assignments, ParsedFile, read_file, read_file_async};
use crate::accessor::present;
use crate::constants::{
    DEFAULT_MODE_VAR, DEFAULT_RUN_MODE, DOTENV_DISABLED_VAR, DOTENV_FILE, LOCAL_SUFFIX,
};
use crate::error::{EnvError, FileLoadError, LoadFailures, Result};
use crate::mode::RunMode;
use crate::store::{EnvStore, ProcessEnv};

/// The environment produced by a loader run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedEnv {
    /// The resolved run mode, also present in `vars` under the mode variable.
    pub mode: String,
    /// Every variable of the effective environment.
    pub vars: BTreeMap<String, String>,
}

impl LoadedEnv {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The run mode, when it is one of the well-known modes.
    pub fn run_mode(&self) -> Option<RunMode> {
        self.mode.parse().ok()
    }
}

/// Loads layered dotenv files into an environment store.
#[derive(Debug, Clone)]
pub struct EnvLoader<S = ProcessEnv> {
    store: S,
    dir: Option<PathBuf>,
    mode_var: String,
}

impl Default for EnvLoader<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvLoader<ProcessEnv> {
    /// Create a loader over the process environment and the current directory.
    pub fn new() -> Self {
        Self::with_store(ProcessEnv)
    }
}

impl<S: EnvStore> EnvLoader<S> {
    /// Create a loader over an explicit store.
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            dir: None,
            mode_var: DEFAULT_MODE_VAR.to_string(),
        }
    }

    /// Look for the dotenv files in `dir` instead of the current directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Read the run mode from `name` instead of `APP_ENV`.
    pub fn with_mode_var(mut self, name: impl Into<String>) -> Self {
        self.mode_var = name.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mode_var(&self) -> &str {
        &self.mode_var
    }

    /// The run mode from the store, or `development` when unset or blank.
    pub fn mode(&self) -> String {
        present(self.store.get(&self.mode_var)).unwrap_or_else(|| DEFAULT_RUN_MODE.to_string())
    }

    /// The dotenv files for `mode`, most specific first.
    pub fn paths(&self, mode: &str) -> [PathBuf; 4] {
        [
            format!("{DOTENV_FILE}.{mode}.{LOCAL_SUFFIX}"),
            format!("{DOTENV_FILE}.{mode}"),
            format!("{DOTENV_FILE}.{LOCAL_SUFFIX}"),
            DOTENV_FILE.to_string(),
        ]
        .map(|file| self.prepend(&file))
    }

    fn prepend(&self, file: &str) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled(&self) -> bool {
        matches!(
            present(self.store.get(DOTENV_DISABLED_VAR)).as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load the layered files and install the merged environment.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::LoadFailed` when none of the four files could be
    /// loaded. Individual missing or malformed files are skipped.
    pub fn load(&self) -> Result<LoadedEnv> {
        let mode = self.mode();
        if self.dotenv_disabled() {
            return Ok(self.install(mode, Vec::new()));
        }

        let results = self
            .paths(&mode)
            .into_iter()
            .map(|path| {
                let result = read_file(&path);
                (path, result)
            })
            .collect();
        self.finish(mode, results)
    }

    /// Like [`load`](Self::load), reading the four files concurrently.
    ///
    /// Over [`ProcessEnv`] the store is replaced from inside the runtime, so no
    /// other task may touch the process environment meanwhile; prefer
    /// [`load`](Self::load) before the runtime starts.
    pub async fn load_async(&self) -> Result<LoadedEnv> {
        let mode = self.mode();
        if self.dotenv_disabled() {
            return Ok(self.install(mode, Vec::new()));
        }

        let paths = self.paths(&mode);
        let reads = futures::future::join_all(paths.iter().cloned().map(read_file_async)).await;
        self.finish(mode, paths.into_iter().zip(reads).collect())
    }

    fn finish(
        &self,
        mode: String,
        results: Vec<(PathBuf, std::result::Result<ParsedFile, FileLoadError>)>,
    ) -> Result<LoadedEnv> {
        let mut layers = Vec::new();
        let mut failures = Vec::new();

        for (path, result) in results {
            match result {
                Ok(parsed) => {
                    for line in &parsed.skipped_lines {
                        warn!(path = %path.display(), line, "skipping malformed dotenv line");
                    }
                    debug!(
                        path = %path.display(),
                        keys = parsed.assignments.len(),
                        "loaded dotenv file"
                    );
                    layers.push(parsed.assignments);
                }
                Err(failure) => {
                    if failure.is_not_found() {
                        debug!(path = %path.display(), "dotenv file not found");
                    } else {
                        warn!(path = %path.display(), error = %failure, "skipping dotenv file");
                    }
                    failures.push(failure);
                }
            }
        }

        if layers.is_empty() {
            return Err(EnvError::LoadFailed(LoadFailures(failures)));
        }

        Ok(self.install(mode, layers))
    }

    fn install(&self, mode: String, layers: Vec<Assignments>) -> LoadedEnv {
        let vars = merge(layers, self.store.vars(), &self.mode_var, &mode);
        self.store.replace(&vars);
        debug!(mode = %mode, vars = vars.len(), "environment loaded");
        LoadedEnv { mode, vars }
    }
}

/// Merge `layers` (most specific first) under the live environment.
///
/// The first assignment of a key wins, both across layers and within one.
fn merge(
    layers: Vec<Assignments>,
    live: BTreeMap<String, String>,
    mode_var: &str,
    mode: &str,
) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for (key, value) in layers.into_iter().flatten() {
        merged.entry(key).or_insert(value);
    }
    merged.extend(live);
    merged.insert(mode_var.to_string(), mode.to_string());
    merged
}

/// Load the layered dotenv files from `dir` (or the current directory) into
/// the process environment.
pub fn load_env(dir: Option<&Path>) -> Result<LoadedEnv> {
    let loader = EnvLoader::new();
    match dir {
        Some(dir) => loader.with_dir(dir).load(),
        None => loader.load(),
    }
}
