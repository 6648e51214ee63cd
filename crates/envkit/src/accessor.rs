//! Typed accessors over an environment store.
//!
//! Responsibilities:
//! - Read a variable, trim it and treat blank values as unset.
//! - Apply the required / optional / defaulted contract for every value type.
//! - Expose process-environment shorthands (`env_int`, `maybe_env_url`, ...).
//!
//! Does NOT handle:
//! - Secrets mounted as files (see `secret.rs`).
//! - Populating the environment from dotenv files (see `loader.rs`).
//!
//! Invariants:
//! - Presence means "non-empty after trimming", for every type.
//! - A fallback only stands in for absence; an explicit malformed value still fails.
//! - Fallbacks are re-read through the same coercion as live values.

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::coerce::{EnvValue, Origin, coerce_enum};
use crate::error::{EnvError, Result};
use crate::store::{EnvStore, ProcessEnv};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    present(ProcessEnv.get(key))
}

pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Coerce a present raw value, or fall back, or fail as missing.
pub(crate) fn resolve<T: EnvValue>(
    key: &str,
    raw: Option<String>,
    fallback: Option<T>,
    origin: Origin,
) -> Result<T> {
    match (raw, fallback) {
        (Some(raw), _) => T::coerce(key, &raw, origin),
        (None, Some(fallback)) => T::coerce(key, fallback.to_raw().trim(), origin),
        (None, None) => Err(EnvError::missing(key)),
    }
}

pub(crate) fn resolve_enum<'a>(
    key: &str,
    raw: Option<String>,
    allowed: &[&'a str],
    fallback: Option<&str>,
    origin: Origin,
) -> Result<&'a str> {
    let raw = raw
        .or_else(|| present(fallback.map(str::to_string)))
        .ok_or_else(|| EnvError::missing(key))?;
    coerce_enum(key, &raw, allowed, origin)
}

/// Typed reader over an [`EnvStore`].
#[derive(Debug, Clone, Default)]
pub struct Env<S = ProcessEnv> {
    store: S,
}

impl Env<ProcessEnv> {
    /// Reader over the live process environment.
    pub fn process() -> Self {
        Self { store: ProcessEnv }
    }
}

impl<S: EnvStore> Env<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Trimmed value of `key`, or None when unset or blank.
    pub fn raw(&self, key: &str) -> Option<String> {
        present(self.store.get(key))
    }

    /// Read `key` as `T`.
    ///
    /// When the variable is unset or blank, `fallback` is used if given;
    /// otherwise this fails with [`EnvError::Missing`]. A present value that
    /// does not coerce fails with the matching invalid-format error.
    pub fn get<T: EnvValue>(&self, key: &str, fallback: Option<T>) -> Result<T> {
        resolve(key, self.raw(key), fallback, Origin::Env)
    }

    /// Read `key` as `T`, returning `Ok(None)` when unset or blank.
    pub fn maybe<T: EnvValue>(&self, key: &str) -> Result<Option<T>> {
        self.raw(key)
            .map(|raw| T::coerce(key, &raw, Origin::Env))
            .transpose()
    }

    /// Read `key` as one of `allowed`.
    pub fn get_enum<'a>(
        &self,
        key: &str,
        allowed: &[&'a str],
        fallback: Option<&str>,
    ) -> Result<&'a str> {
        resolve_enum(key, self.raw(key), allowed, fallback, Origin::Env)
    }

    /// Read `key` as one of `allowed`, returning `Ok(None)` when unset or blank.
    pub fn maybe_enum<'a>(&self, key: &str, allowed: &[&'a str]) -> Result<Option<&'a str>> {
        self.raw(key)
            .map(|raw| coerce_enum(key, &raw, allowed, Origin::Env))
            .transpose()
    }
}

macro_rules! process_accessors {
    ($($ty:ty => $get:ident, $maybe:ident;)*) => {
        $(
            #[doc = concat!("Read `key` from the process environment as `", stringify!($ty), "`.")]
            pub fn $get(key: &str, fallback: Option<$ty>) -> Result<$ty> {
                Env::process().get(key, fallback)
            }

            #[doc = concat!("Read optional `key` from the process environment as `", stringify!($ty), "`.")]
            pub fn $maybe(key: &str) -> Result<Option<$ty>> {
                Env::process().maybe(key)
            }
        )*
    };
}

process_accessors! {
    bool => env_bool, maybe_env_bool;
    i64 => env_int, maybe_env_int;
    f64 => env_float, maybe_env_float;
    String => env_string, maybe_env_string;
    Vec<String> => env_strings, maybe_env_strings;
    Url => env_url, maybe_env_url;
    Uuid => env_uuid, maybe_env_uuid;
    DateTime<Utc> => env_date, maybe_env_date;
}

/// Read `key` from the process environment as one of `allowed`.
pub fn env_enum<'a>(key: &str, allowed: &[&'a str], fallback: Option<&str>) -> Result<&'a str> {
    Env::process().get_enum(key, allowed, fallback)
}

/// Read optional `key` from the process environment as one of `allowed`.
pub fn maybe_env_enum<'a>(key: &str, allowed: &[&'a str]) -> Result<Option<&'a str>> {
    Env::process().maybe_enum(key, allowed)
}
