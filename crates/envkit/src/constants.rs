//! Centralized constants for the envkit workspace.
//!
//! This module contains the conventional names and locations shared by the
//! loader, the secret reader and the CLI.

// =============================================================================
// Run Mode
// =============================================================================

/// Environment variable selecting the run mode when none is configured.
pub const DEFAULT_MODE_VAR: &str = "APP_ENV";

/// Run mode used when the mode variable is unset or blank.
pub const DEFAULT_RUN_MODE: &str = "development";

// =============================================================================
// Dotenv Files
// =============================================================================

/// Base name shared by all layered dotenv files.
pub const DOTENV_FILE: &str = ".env";

/// Suffix of the machine-local dotenv layers.
pub const LOCAL_SUFFIX: &str = "local";

/// Variable that disables dotenv loading entirely when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

// =============================================================================
// Secrets & Lists
// =============================================================================

/// Directory where orchestrators mount secrets by convention.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// Separator between elements of string list values.
pub const LIST_SEPARATOR: char = ',';
