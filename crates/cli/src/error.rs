//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `EnvError` variants to appropriate exit codes.
//!
//! Invariants:
//! - Exit codes 1-5 are reserved for specific error categories.

use envkit::EnvError;

/// Structured exit codes for envkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// The value is unset, blank, or not mounted.
    Missing = 2,

    /// The value is present but does not coerce to the requested kind.
    Invalid = 3,

    /// An explicitly configured secret could not be read or is empty.
    SecretUnavailable = 4,

    /// None of the layered .env files could be loaded.
    LoadFailed = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&EnvError> for ExitCode {
    fn from(error: &EnvError) -> Self {
        match error {
            EnvError::Missing { .. } => Self::Missing,
            EnvError::Unreadable { .. } | EnvError::Empty { .. } => Self::SecretUnavailable,
            EnvError::LoadFailed(_) => Self::LoadFailed,
            other if other.is_invalid() => Self::Invalid,
            _ => Self::GeneralError,
        }
    }
}

/// Extension trait to derive an exit code from an `anyhow::Error`.
pub trait ExitCodeExt {
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        self.downcast_ref::<EnvError>()
            .map(ExitCode::from)
            .unwrap_or(ExitCode::GeneralError)
    }
}
