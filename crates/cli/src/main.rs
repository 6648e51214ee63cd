//! envkit - inspect layered `.env` configuration and mounted secrets.
//!
//! Responsibilities:
//! - Parse command-line arguments.
//! - Initialize logging on stderr so stdout stays machine-readable.
//! - Map library errors to structured exit codes.
//!
//! Does NOT handle:
//! - Loading or coercion logic (see `crates/envkit`).
//!
//! Invariants:
//! - `.env` files are loaded by the subcommands AFTER parsing, so `--dir` and
//!   `--mode-var` select which files are read.
//! - `main` is synchronous: the process environment is replaced while only
//!   the main thread exists, and `get` builds a current-thread runtime after.

mod args;
mod commands;
mod error;

use args::Cli;
use clap::Parser;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let code = match commands::run(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {e:#}");
            e.exit_code()
        }
    };
    std::process::exit(code.as_i32());
}
