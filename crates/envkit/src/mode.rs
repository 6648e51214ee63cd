//! Run modes selecting the layered dotenv files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The well-known run modes.
///
/// The loader accepts any mode string; this type covers the conventional ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
    Test,
}

impl RunMode {
    /// Every mode, in declaration order. Usable as an allowed set for
    /// `Env::get_enum`.
    pub const ALL: [&'static str; 3] = ["development", "production", "test"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    /// Parse `value`, or return `fallback` when it is not a known mode.
    pub fn parse_or(value: &str, fallback: RunMode) -> RunMode {
        value.parse().unwrap_or(fallback)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known run mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid run mode: {0}")]
pub struct UnknownRunMode(pub String);

impl FromStr for RunMode {
    type Err = UnknownRunMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(UnknownRunMode(other.to_string())),
        }
    }
}
