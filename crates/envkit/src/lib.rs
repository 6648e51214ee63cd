//! Typed configuration access for envkit.
//!
//! This crate reads process configuration from environment variables,
//! layered `.env` files and secrets mounted as files, and converts the raw
//! strings into booleans, numbers, strings, lists, URLs, UUIDs, dates and
//! closed enumerations.
//!
//! Every value type supports three access patterns:
//! - required: `env_int("PORT", None)` fails when unset or blank;
//! - defaulted: `env_int("PORT", Some(3000))` uses the fallback instead;
//! - optional: `maybe_env_int("PORT")` returns `Ok(None)` instead.
//!
//! ```no_run
//! use envkit::{EnvLoader, env_bool, env_int};
//!
//! EnvLoader::new().load()?;
//! let port = env_int("PORT", Some(3000))?;
//! let debug = env_bool("DEBUG", Some(false))?;
//! # Ok::<(), envkit::EnvError>(())
//! ```

mod accessor;
mod coerce;
pub mod constants;
mod error;
mod loader;
mod mode;
mod secret;
pub mod store;

pub use accessor::{
    Env, env_bool, env_date, env_enum, env_float, env_int, env_string, env_strings, env_url,
    env_uuid, env_var_or_none, maybe_env_bool, maybe_env_date, maybe_env_enum, maybe_env_float,
    maybe_env_int, maybe_env_string, maybe_env_strings, maybe_env_url, maybe_env_uuid,
};
pub use coerce::{
    EnvValue, Origin, is_enum, is_uuid, to_bool, to_date, to_enum, to_float, to_int, to_strings,
    to_url, to_uuid,
};
pub use error::{EnvError, FileLoadError, LoadFailures, RawValue, Result, SecretStage};
pub use loader::{EnvLoader, LoadedEnv, load_env};
pub use mode::{RunMode, UnknownRunMode};
pub use secret::{
    SecretPath, SecretReader, maybe_secret_bool, maybe_secret_date, maybe_secret_enum,
    maybe_secret_float, maybe_secret_int, maybe_secret_string, maybe_secret_strings,
    maybe_secret_url, maybe_secret_uuid, secret_bool, secret_date, secret_enum, secret_float,
    secret_int, secret_string, secret_strings, secret_url, secret_uuid,
};
pub use store::{EnvStore, MemoryEnv, ProcessEnv};
