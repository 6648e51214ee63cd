//! `envkit get`: resolve one typed value.
//!
//! Invariants:
//! - `.env` files are loaded first unless `--no-dotenv`; a load that finds no
//!   file is not fatal here, the live environment is still consulted.
//! - Secret strings are redacted unless `--reveal` is given.

use anyhow::Result;
use chrono::{DateTime, Utc};
use envkit::{Env, EnvError, EnvLoader, EnvValue, Origin, SecretReader};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::args::{GetArgs, OutputFormat, ValueKind};

const REDACTED: &str = "[REDACTED]";

/// A resolved value in both output shapes.
#[derive(Debug, Clone, PartialEq)]
struct Rendered {
    text: String,
    json: Value,
}

impl Rendered {
    fn string(text: String) -> Self {
        Self {
            json: Value::String(text.clone()),
            text,
        }
    }

    fn float(value: f64) -> Self {
        let text = value.to_raw();
        let json = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.clone()));
        Self { text, json }
    }
}

/// Load the layered `.env` files. Finding none is not fatal: the live
/// environment is still consulted.
pub fn load_dotenv(loader: &EnvLoader) -> Result<()> {
    match loader.load() {
        Ok(loaded) => tracing::debug!(mode = %loaded.mode, "environment loaded"),
        Err(EnvError::LoadFailed(failures)) => {
            tracing::debug!(%failures, "no .env file loaded, using the live environment");
        }
        Err(error) => return Err(error.into()),
    }
    Ok(())
}

pub async fn run(args: GetArgs, output: OutputFormat) -> Result<()> {
    let secrets = match &args.secrets_dir {
        Some(dir) => SecretReader::process().with_secrets_dir(dir),
        None => SecretReader::process(),
    };
    let lookup = Lookup {
        args: &args,
        env: Env::process(),
        secrets,
    };

    match (output, lookup.resolve().await?) {
        (OutputFormat::Text, Some(value)) => println!("{}", value.text),
        (OutputFormat::Text, None) => {}
        (OutputFormat::Json, value) => {
            let json = value.map(|v| v.json).unwrap_or(Value::Null);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

struct Lookup<'a> {
    args: &'a GetArgs,
    env: Env,
    secrets: SecretReader,
}

impl Lookup<'_> {
    async fn resolve(&self) -> Result<Option<Rendered>, EnvError> {
        let rendered = match self.args.kind {
            ValueKind::Bool => self.typed::<bool>().await?.map(|v| Rendered {
                text: v.to_string(),
                json: Value::Bool(v),
            }),
            ValueKind::Int => self.typed::<i64>().await?.map(|v| Rendered {
                text: v.to_string(),
                json: Value::from(v),
            }),
            ValueKind::Float => self.typed::<f64>().await?.map(Rendered::float),
            ValueKind::String if self.args.secret => {
                self.typed::<SecretString>().await?.map(|v| {
                    if self.args.reveal {
                        Rendered::string(v.expose_secret().to_string())
                    } else {
                        Rendered::string(REDACTED.to_string())
                    }
                })
            }
            ValueKind::String => self.typed::<String>().await?.map(Rendered::string),
            ValueKind::Strings => self.typed::<Vec<String>>().await?.map(|v| Rendered {
                text: v.join("\n"),
                json: Value::from(v),
            }),
            ValueKind::Url => self.typed::<Url>().await?.map(|v| Rendered::string(v.to_raw())),
            ValueKind::Uuid => self.typed::<Uuid>().await?.map(|v| Rendered::string(v.to_raw())),
            ValueKind::Date => self
                .typed::<DateTime<Utc>>()
                .await?
                .map(|v| Rendered::string(v.to_raw())),
            ValueKind::Enum => self.enumeration().await?.map(Rendered::string),
        };
        Ok(rendered)
    }

    async fn typed<T: EnvValue>(&self) -> Result<Option<T>, EnvError> {
        let key = self.args.key.as_str();
        let fallback = self
            .args
            .default
            .as_deref()
            .map(|raw| T::coerce(key, raw.trim(), Origin::Env))
            .transpose()?;

        match (self.args.secret, self.args.optional) {
            (true, true) => self.secrets.maybe(key).await,
            (true, false) => self.secrets.get(key, fallback).await.map(Some),
            (false, true) => self.env.maybe(key),
            (false, false) => self.env.get(key, fallback).map(Some),
        }
    }

    async fn enumeration(&self) -> Result<Option<String>, EnvError> {
        let key = self.args.key.as_str();
        let allowed: Vec<&str> = self.args.one_of.iter().map(String::as_str).collect();
        let fallback = self.args.default.as_deref();

        let member = match (self.args.secret, self.args.optional) {
            (true, true) => self.secrets.maybe_enum(key, &allowed).await?,
            (true, false) => Some(self.secrets.get_enum(key, &allowed, fallback).await?),
            (false, true) => self.env.maybe_enum(key, &allowed)?,
            (false, false) => Some(self.env.get_enum(key, &allowed, fallback)?),
        };
        Ok(member.map(str::to_string))
    }
}
