//! Key-value stores backing the environment accessors.
//!
//! Responsibilities:
//! - Abstract reads and wholesale replacement of the environment map.
//! - Bind the abstraction to the real process environment (`ProcessEnv`).
//! - Provide an in-memory store for tests and embedding (`MemoryEnv`).
//!
//! Does NOT handle:
//! - Trimming, blank filtering or coercion (see `accessor.rs`).
//!
//! Invariants:
//! - This is the only module that touches `std::env`.
//! - `replace` installs exactly the given map: keys absent from it are removed.

use std::collections::BTreeMap;
use std::sync::RwLock;

/// A readable and replaceable map of environment variables.
pub trait EnvStore: Send + Sync {
    /// Raw value of `key`, untrimmed. `None` when unset or not valid UTF-8.
    fn get(&self, key: &str) -> Option<String>;

    /// Snapshot of every variable.
    fn vars(&self) -> BTreeMap<String, String>;

    /// Replace the whole environment with `vars`.
    fn replace(&self, vars: &BTreeMap<String, String>);
}

impl<S: EnvStore + ?Sized> EnvStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn vars(&self) -> BTreeMap<String, String> {
        (**self).vars()
    }

    fn replace(&self, vars: &BTreeMap<String, String>) {
        (**self).replace(vars)
    }
}

/// The live process environment.
///
/// `replace` must not race with environment access on other threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn vars(&self) -> BTreeMap<String, String> {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    fn replace(&self, vars: &BTreeMap<String, String>) {
        let stale: Vec<String> = self
            .vars()
            .into_keys()
            .filter(|key| !vars.contains_key(key))
            .collect();

        // SAFETY: callers run the replacement while no other thread reads or
        // writes the environment. `EnvLoader::load` is meant to run before a
        // multi-threaded runtime starts, as the envkit binary does.
        unsafe {
            for key in stale {
                std::env::remove_var(key);
            }
            for (key, value) in vars {
                if std::env::var(key).ok().as_deref() != Some(value.as_str()) {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

/// An environment held in memory, isolated from the process.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: RwLock<BTreeMap<String, String>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single variable.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.write().insert(key.into(), value.into());
    }

    /// Remove a single variable.
    pub fn remove(&self, key: &str) {
        self.write().remove(key);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.vars.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.vars.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            vars: RwLock::new(vars),
        }
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    fn vars(&self) -> BTreeMap<String, String> {
        self.read().clone()
    }

    fn replace(&self, vars: &BTreeMap<String, String>) {
        *self.write() = vars.clone();
    }
}
