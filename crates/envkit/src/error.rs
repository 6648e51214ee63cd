//! Error types for typed configuration access.
//!
//! Responsibilities:
//! - Define one error variant per failure class: missing, invalid format,
//!   unreadable or empty secret, and failed dotenv loading.
//! - Render messages of the shape `$KEY is <reason>[: <raw value>]`.
//!
//! Does NOT handle:
//! - Recovery. Optional and fallback accessors decide which variants count as
//!   absence (see `accessor.rs` and `secret.rs`).
//!
//! Invariants:
//! - Secret accessors construct invalid-format errors with `RawValue::Redacted`,
//!   so secret content is never stored in an error.
//! - Dotenv load errors carry the path and I/O kind, never file content.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = EnvError> = std::result::Result<T, E>;

/// The raw text that failed to coerce, if it may be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Value read from the environment; rendered as `: <value>`.
    Shown(String),
    /// Value read from a secret; never rendered.
    Redacted,
}

impl RawValue {
    /// The raw text, if it was not redacted.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Shown(value) => Some(value),
            Self::Redacted => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shown(value) => write!(f, ": {value}"),
            Self::Redacted => Ok(()),
        }
    }
}

/// Which filesystem step failed while resolving a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStage {
    Access,
    Read,
}

impl fmt::Display for SecretStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Read => f.write_str("read"),
        }
    }
}

/// Errors that can occur while reading typed configuration values.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("${key} is missing")]
    Missing { key: String },

    #[error("${key} is not a boolean{raw}")]
    NotABoolean { key: String, raw: RawValue },

    #[error("${key} is not a number{raw}")]
    NotANumber { key: String, raw: RawValue },

    #[error("${key} is not a URL{raw}")]
    NotAUrl {
        key: String,
        raw: RawValue,
        #[source]
        source: url::ParseError,
    },

    #[error("${key} is not a UUID{raw}")]
    NotAUuid { key: String, raw: RawValue },

    #[error("${key} is not a valid Date{raw}")]
    NotAValidDate { key: String, raw: RawValue },

    #[error("${key} is not one of {}{raw}", .allowed.join(", "))]
    NotOneOf {
        key: String,
        allowed: Vec<String>,
        raw: RawValue,
    },

    /// An explicitly configured secret path could not be accessed or read.
    #[error("Couldn't {stage} secret at \"{}\"", .path.display())]
    Unreadable {
        key: String,
        path: PathBuf,
        stage: SecretStage,
        #[source]
        source: std::io::Error,
    },

    /// An explicitly configured secret file contains only whitespace.
    #[error("The secret at \"{}\" is empty", .path.display())]
    Empty { key: String, path: PathBuf },

    /// None of the layered dotenv files could be loaded.
    #[error("Environment variables could not be loaded")]
    LoadFailed(#[source] LoadFailures),
}

impl EnvError {
    /// The variable the error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Missing { key }
            | Self::NotABoolean { key, .. }
            | Self::NotANumber { key, .. }
            | Self::NotAUrl { key, .. }
            | Self::NotAUuid { key, .. }
            | Self::NotAValidDate { key, .. }
            | Self::NotOneOf { key, .. }
            | Self::Unreadable { key, .. }
            | Self::Empty { key, .. } => Some(key),
            Self::LoadFailed(_) => None,
        }
    }

    /// Returns true when the value was absent (unset, blank or an empty secret).
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. } | Self::Empty { .. })
    }

    /// Returns true when a present value failed to coerce.
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            Self::NotABoolean { .. }
                | Self::NotANumber { .. }
                | Self::NotAUrl { .. }
                | Self::NotAUuid { .. }
                | Self::NotAValidDate { .. }
                | Self::NotOneOf { .. }
        )
    }

    pub(crate) fn missing(key: &str) -> Self {
        Self::Missing {
            key: key.to_string(),
        }
    }
}

/// A dotenv file that could not be read.
///
/// Only I/O failures make a file fail; lines that do not parse are skipped
/// by the loader and never reach an error.
#[derive(Error, Debug)]
#[error("failed to load {}: {}", .path.display(), .source.kind())]
pub struct FileLoadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl FileLoadError {
    /// Returns true when the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == ErrorKind::NotFound
    }
}

/// Every per-file failure collected by a loader run that loaded nothing.
#[derive(Debug)]
pub struct LoadFailures(pub Vec<FileLoadError>);

impl LoadFailures {
    pub fn iter(&self) -> impl Iterator<Item = &FileLoadError> {
        self.0.iter()
    }
}

impl fmt::Display for LoadFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for LoadFailures {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0
            .first()
            .map(|error| error as &(dyn std::error::Error + 'static))
    }
}
