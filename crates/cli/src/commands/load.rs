//! `envkit load`: run the layered loader and print the result.

use anyhow::Result;
use envkit::EnvLoader;

use crate::args::OutputFormat;

pub fn run(loader: &EnvLoader, keys_only: bool, output: OutputFormat) -> Result<()> {
    let loaded = loader.load()?;
    tracing::info!(mode = %loaded.mode, vars = loaded.vars.len(), "environment loaded");

    match output {
        OutputFormat::Json if keys_only => {
            let keys: Vec<&String> = loaded.vars.keys().collect();
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&loaded)?),
        OutputFormat::Text => {
            for (key, value) in &loaded.vars {
                if keys_only {
                    println!("{key}");
                } else {
                    println!("{key}={value}");
                }
            }
        }
    }
    Ok(())
}
