//! Layered dotenv loading.
//!
//! Responsibilities:
//! - Resolve the run mode from the live environment (never from files).
//! - Read `.env.{mode}.local`, `.env.{mode}`, `.env.local` and `.env`,
//!   optionally inside a base directory.
//! - Merge them by precedence and write the result back as the environment.
//!
//! Does NOT handle:
//! - Typed access to the merged values (see `accessor.rs`).
//! - Secrets mounted as files (see `secret.rs`).
//!
//! Invariants / Assumptions:
//! - Earlier files in the list win over later ones for the same key.
//! - Values already present in the environment always win over every file.
//! - Missing or unreadable files are skipped; loading fails only when no file
//!   could be loaded at all.
//! - `DOTENV_DISABLED=1`/`true` skips every file.

mod builder;
mod files;

#[cfg(test)]
mod tests;

pub use builder::{EnvLoader, LoadedEnv, load_env};
