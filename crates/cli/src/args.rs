//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Describe value kinds and output formats accepted on the command line.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `commands` module).

use clap::{Args, Parser, Subcommand, ValueEnum};
use envkit::constants::DEFAULT_MODE_VAR;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "envkit")]
#[command(about = "Inspect layered .env configuration and mounted secrets", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  envkit load --dir ./config\n  envkit get PORT --kind int --default 3000\n  envkit get LOG_LEVEL --kind enum --one-of debug,info,warn,error\n  envkit get DB_PASSWORD --secret --optional\n"
)]
pub struct Cli {
    /// Directory containing the .env files (defaults to the current directory)
    #[arg(long, global = true, env = "ENVKIT_DIR", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Environment variable holding the run mode
    #[arg(long, global = true, default_value = DEFAULT_MODE_VAR, value_name = "NAME")]
    pub mode_var: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Enable debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the layered .env files and print the merged environment
    Load {
        /// Print variable names only
        #[arg(long)]
        keys_only: bool,
    },
    /// Resolve a single typed value from the environment or a secret file
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Variable (or secret) name
    pub key: String,

    /// Type to coerce the value into
    #[arg(short, long, value_enum, default_value_t = ValueKind::String)]
    pub kind: ValueKind,

    /// Allowed values for `--kind enum`, comma separated
    #[arg(long, value_delimiter = ',', required_if_eq("kind", "enum"))]
    pub one_of: Vec<String>,

    /// Fallback used when the value is absent
    #[arg(long, value_name = "VALUE")]
    pub default: Option<String>,

    /// Print nothing (or null) instead of failing when the value is absent
    #[arg(long, conflicts_with = "default")]
    pub optional: bool,

    /// Read the value from a secret file instead of the environment
    #[arg(long)]
    pub secret: bool,

    /// Directory of conventionally mounted secrets
    #[arg(long, requires = "secret", value_name = "DIR")]
    pub secrets_dir: Option<PathBuf>,

    /// Print secret strings instead of redacting them
    #[arg(long)]
    pub reveal: bool,

    /// Skip loading .env files before resolving
    #[arg(long)]
    pub no_dotenv: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    Strings,
    Url,
    Uuid,
    Date,
    Enum,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_enum_kind_requires_allowed_values() {
        let result = Cli::try_parse_from(["envkit", "get", "MODE", "--kind", "enum"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "envkit", "get", "MODE", "--kind", "enum", "--one-of", "a,b,c",
        ])
        .unwrap();
        match cli.command {
            Commands::Get(args) => assert_eq!(args.one_of, vec!["a", "b", "c"]),
            Commands::Load { .. } => panic!("expected get"),
        }
    }

    #[test]
    fn test_optional_conflicts_with_default() {
        let result = Cli::try_parse_from(["envkit", "get", "PORT", "--optional", "--default", "1"]);
        assert!(result.is_err());
    }
}
