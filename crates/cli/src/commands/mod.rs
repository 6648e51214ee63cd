//! Command implementations.
//!
//! Responsibilities:
//! - Build the loader for the global options.
//! - Dispatch each subcommand and print its result to stdout.
//!
//! Invariants:
//! - `.env` files are loaded synchronously on the main thread, before the
//!   tokio runtime exists, because loading replaces the process environment.

mod get;
mod load;

use anyhow::Result;
use envkit::EnvLoader;

use crate::args::{Cli, Commands};

/// Execute the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let loader = loader_for(&cli);
    match cli.command {
        Commands::Load { keys_only } => load::run(&loader, keys_only, cli.output),
        Commands::Get(args) => {
            if !args.no_dotenv {
                get::load_dotenv(&loader)?;
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(get::run(args, cli.output))
        }
    }
}

fn loader_for(cli: &Cli) -> EnvLoader {
    let loader = EnvLoader::new().with_mode_var(cli.mode_var.clone());
    match &cli.dir {
        Some(dir) => loader.with_dir(dir),
        None => loader,
    }
}
