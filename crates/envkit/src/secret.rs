//! Typed accessors for secrets mounted as files.
//!
//! Responsibilities:
//! - Resolve a secret's path: the value of the same-named variable when set,
//!   otherwise `{secrets_dir}/{key}` (default `/run/secrets`).
//! - Read and trim the file asynchronously, distinguishing missing,
//!   unreadable and empty secrets.
//! - Apply the required / optional / defaulted contract on top of the content.
//!
//! Does NOT handle:
//! - Caching. Every call re-reads the file.
//! - Remote secret stores, rotation or decryption.
//!
//! Invariants:
//! - A missing or blank file at the conventional path is `Missing`; at an
//!   explicit path it is `Unreadable` / `Empty`.
//! - Invalid-format errors never include the secret content.
//! - Optional accessors treat every resolution failure as absence but still
//!   report invalid formats.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;
use uuid::Uuid;

use crate::accessor::{present, resolve, resolve_enum};
use crate::coerce::{EnvValue, Origin, coerce_enum};
use crate::constants::DEFAULT_SECRETS_DIR;
use crate::error::{EnvError, Result, SecretStage};
use crate::store::{EnvStore, ProcessEnv};

/// Where a secret is expected to live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretPath {
    /// Path taken from the environment variable named like the secret.
    Explicit(PathBuf),
    /// Conventional mount location inside the secrets directory.
    Conventional(PathBuf),
}

impl SecretPath {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Conventional(path) => path,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

/// Reads typed secrets from files.
#[derive(Debug, Clone)]
pub struct SecretReader<S = ProcessEnv> {
    store: S,
    secrets_dir: PathBuf,
}

impl Default for SecretReader<ProcessEnv> {
    fn default() -> Self {
        Self::process()
    }
}

impl SecretReader<ProcessEnv> {
    /// Reader resolving explicit paths from the live process environment.
    pub fn process() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<S: EnvStore> SecretReader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            secrets_dir: PathBuf::from(DEFAULT_SECRETS_DIR),
        }
    }

    /// Override the directory used for conventional secret paths.
    pub fn with_secrets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.secrets_dir = dir.into();
        self
    }

    pub fn secrets_dir(&self) -> &Path {
        &self.secrets_dir
    }

    /// Decide where the secret `key` should be read from.
    ///
    /// The conventional path always stays under the secrets directory, even
    /// for a key with a leading `/`.
    pub fn locate(&self, key: &str) -> SecretPath {
        match present(self.store.get(key)) {
            Some(path) => SecretPath::Explicit(PathBuf::from(path)),
            None => {
                SecretPath::Conventional(self.secrets_dir.join(key.trim_start_matches('/')))
            }
        }
    }

    /// Read the trimmed, non-empty content of the secret `key`.
    pub async fn read(&self, key: &str) -> Result<SecretString> {
        let location = self.locate(key);
        let path = location.path();
        trace!(
            key,
            path = %path.display(),
            explicit = location.is_explicit(),
            "resolving secret"
        );

        if let Err(source) = tokio::fs::metadata(path).await {
            return Err(match location {
                SecretPath::Conventional(_) => EnvError::missing(key),
                SecretPath::Explicit(path) => EnvError::Unreadable {
                    key: key.to_string(),
                    path,
                    stage: SecretStage::Access,
                    source,
                },
            });
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| EnvError::Unreadable {
                key: key.to_string(),
                path: path.to_path_buf(),
                stage: SecretStage::Read,
                source,
            })?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(match location {
                SecretPath::Conventional(_) => EnvError::missing(key),
                SecretPath::Explicit(path) => EnvError::Empty {
                    key: key.to_string(),
                    path,
                },
            });
        }

        Ok(SecretString::new(trimmed.into()))
    }

    async fn read_optional(&self, key: &str) -> Option<SecretString> {
        match self.read(key).await {
            Ok(secret) => Some(secret),
            Err(error) => {
                debug!(key, %error, "optional secret unavailable");
                None
            }
        }
    }

    /// Read the secret `key` as `T`.
    ///
    /// With a fallback, any resolution failure yields the fallback; an
    /// invalid format is still reported.
    pub async fn get<T: EnvValue>(&self, key: &str, fallback: Option<T>) -> Result<T> {
        match fallback {
            Some(fallback) => match self.maybe(key).await? {
                Some(value) => Ok(value),
                None => resolve(key, None, Some(fallback), Origin::Secret),
            },
            None => {
                let secret = self.read(key).await?;
                T::coerce(key, secret.expose_secret(), Origin::Secret)
            }
        }
    }

    /// Read the secret `key` as `T`, returning `Ok(None)` when it cannot be resolved.
    pub async fn maybe<T: EnvValue>(&self, key: &str) -> Result<Option<T>> {
        self.read_optional(key)
            .await
            .map(|secret| T::coerce(key, secret.expose_secret(), Origin::Secret))
            .transpose()
    }

    /// Read the secret `key` as one of `allowed`.
    pub async fn get_enum<'a>(
        &self,
        key: &str,
        allowed: &[&'a str],
        fallback: Option<&str>,
    ) -> Result<&'a str> {
        match fallback {
            Some(fallback) => match self.maybe_enum(key, allowed).await? {
                Some(member) => Ok(member),
                None => resolve_enum(key, None, allowed, Some(fallback), Origin::Secret),
            },
            None => {
                let secret = self.read(key).await?;
                coerce_enum(key, secret.expose_secret(), allowed, Origin::Secret)
            }
        }
    }

    /// Read the secret `key` as one of `allowed`, returning `Ok(None)` when it
    /// cannot be resolved.
    pub async fn maybe_enum<'a>(&self, key: &str, allowed: &[&'a str]) -> Result<Option<&'a str>> {
        self.read_optional(key)
            .await
            .map(|secret| coerce_enum(key, secret.expose_secret(), allowed, Origin::Secret))
            .transpose()
    }
}

macro_rules! process_secret_accessors {
    ($($ty:ty => $get:ident, $maybe:ident;)*) => {
        $(
            #[doc = concat!("Read the secret `key` as `", stringify!($ty), "`.")]
            pub async fn $get(key: &str, fallback: Option<$ty>) -> Result<$ty> {
                SecretReader::process().get(key, fallback).await
            }

            #[doc = concat!("Read the optional secret `key` as `", stringify!($ty), "`.")]
            pub async fn $maybe(key: &str) -> Result<Option<$ty>> {
                SecretReader::process().maybe(key).await
            }
        )*
    };
}

process_secret_accessors! {
    bool => secret_bool, maybe_secret_bool;
    i64 => secret_int, maybe_secret_int;
    f64 => secret_float, maybe_secret_float;
    SecretString => secret_string, maybe_secret_string;
    Vec<String> => secret_strings, maybe_secret_strings;
    Url => secret_url, maybe_secret_url;
    Uuid => secret_uuid, maybe_secret_uuid;
    DateTime<Utc> => secret_date, maybe_secret_date;
}

/// Read the secret `key` as one of `allowed`.
pub async fn secret_enum<'a>(
    key: &str,
    allowed: &[&'a str],
    fallback: Option<&str>,
) -> Result<&'a str> {
    SecretReader::process()
        .get_enum(key, allowed, fallback)
        .await
}

/// Read the optional secret `key` as one of `allowed`.
pub async fn maybe_secret_enum<'a>(key: &str, allowed: &[&'a str]) -> Result<Option<&'a str>> {
    SecretReader::process().maybe_enum(key, allowed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEnv;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        env: MemoryEnv,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                env: MemoryEnv::new(),
            }
        }

        /// Write a secret file and point `key` at it explicitly.
        fn explicit(&self, key: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(format!("explicit-{key}"));
            fs::write(&path, content).unwrap();
            self.env.set(key, path.to_string_lossy());
            path
        }

        /// Write a secret file at the conventional location only.
        fn conventional(&self, key: &str, content: &str) {
            let mounts = self.dir.path().join("mounts");
            fs::create_dir_all(&mounts).unwrap();
            fs::write(mounts.join(key), content).unwrap();
        }

        fn reader(&self) -> SecretReader<&MemoryEnv> {
            SecretReader::new(&self.env).with_secrets_dir(self.dir.path().join("mounts"))
        }
    }

    #[tokio::test]
    async fn test_explicit_path_trims_content() {
        let fixture = Fixture::new();
        fixture.explicit("DB_PORT", "  42  \n");

        let value: i64 = fixture.reader().get("DB_PORT", None).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_conventional_path_is_used_without_variable() {
        let fixture = Fixture::new();
        fixture.conventional("API_URL", "https://example.com\n");

        let url: Url = fixture.reader().get("API_URL", None).await.unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
        assert!(!fixture.reader().locate("API_URL").is_explicit());
    }

    #[test]
    fn test_absolute_key_stays_under_secrets_dir() {
        let fixture = Fixture::new();
        let reader = fixture.reader();

        let location = reader.locate("/etc/hostname");
        assert_eq!(
            location,
            SecretPath::Conventional(fixture.dir.path().join("mounts/etc/hostname"))
        );
        assert!(location.path().starts_with(reader.secrets_dir()));
    }

    #[tokio::test]
    async fn test_absolute_key_does_not_read_outside_secrets_dir() {
        let fixture = Fixture::new();
        let outside = fixture.dir.path().join("outside");
        fs::write(&outside, "leaked").unwrap();

        let key = outside.to_string_lossy().into_owned();
        let err = fixture
            .reader()
            .get::<SecretString>(&key, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EnvError::Missing { .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_secret_is_missing_not_unreadable() {
        let fixture = Fixture::new();
        let err = fixture
            .reader()
            .get::<bool>("SECRET_UNSET_BOOL", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EnvError::Missing { .. }));
        assert_eq!(err.to_string(), "$SECRET_UNSET_BOOL is missing");
    }

    #[tokio::test]
    async fn test_blank_conventional_secret_is_missing() {
        let fixture = Fixture::new();
        fixture.conventional("TOKEN", " \n ");
        let err = fixture
            .reader()
            .get::<SecretString>("TOKEN", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EnvError::Missing { .. }));
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_unreadable() {
        let fixture = Fixture::new();
        let path = fixture.dir.path().join("nowhere");
        fixture.env.set("TOKEN", path.to_string_lossy());

        let err = fixture
            .reader()
            .get::<SecretString>("TOKEN", None)
            .await
            .unwrap_err();
        match &err {
            EnvError::Unreadable { stage, .. } => assert_eq!(*stage, SecretStage::Access),
            other => panic!("expected Unreadable, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            format!("Couldn't access secret at \"{}\"", path.display())
        );
    }

    #[tokio::test]
    async fn test_explicit_directory_is_unreadable_on_read() {
        let fixture = Fixture::new();
        fixture.env.set("TOKEN", fixture.dir.path().to_string_lossy());

        let err = fixture.reader().read("TOKEN").await.unwrap_err();
        assert!(matches!(
            err,
            EnvError::Unreadable {
                stage: SecretStage::Read,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_explicit_empty_file_is_empty() {
        let fixture = Fixture::new();
        let path = fixture.explicit("SECRET_NO_BOOL", "   ");

        let err = fixture
            .reader()
            .get::<bool>("SECRET_NO_BOOL", None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("The secret at \"{}\" is empty", path.display())
        );
    }

    #[tokio::test]
    async fn test_invalid_secret_does_not_leak_content() {
        let fixture = Fixture::new();
        fixture.explicit("SECRET_INVALID_BOOL", "hunter2");

        let err = fixture
            .reader()
            .get::<bool>("SECRET_INVALID_BOOL", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "$SECRET_INVALID_BOOL is not a boolean");
        assert!(!format!("{err:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn test_fallback_replaces_unresolvable_secret() {
        let fixture = Fixture::new();
        fixture.explicit("SECRET_NO_FLOAT", "");

        let reader = fixture.reader();
        assert!(reader.get("SECRET_NO_BOOL", Some(true)).await.unwrap());
        let phi = (1.0 + 5f64.sqrt()) / 2.0;
        assert_eq!(reader.get("SECRET_NO_FLOAT", Some(phi)).await.unwrap(), phi);
        assert_eq!(
            reader
                .get("SECRET_NO_STRINGS", Some(vec![" a ".to_string()]))
                .await
                .unwrap(),
            vec!["a"]
        );
    }

    #[tokio::test]
    async fn test_fallback_does_not_mask_invalid_secret() {
        let fixture = Fixture::new();
        fixture.explicit("SECRET_INVALID_INT", "abc");

        let err = fixture
            .reader()
            .get("SECRET_INVALID_INT", Some(7_i64))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "$SECRET_INVALID_INT is not a number");
    }

    #[tokio::test]
    async fn test_maybe_swallows_resolution_failures_only() {
        let fixture = Fixture::new();
        fixture.explicit("EMPTY", "");
        fixture.explicit("BAD_UUID", "nope");
        fixture.env.set("GONE", fixture.dir.path().join("gone").to_string_lossy());

        let reader = fixture.reader();
        assert_eq!(reader.maybe::<i64>("UNSET").await.unwrap(), None);
        assert_eq!(reader.maybe::<i64>("EMPTY").await.unwrap(), None);
        assert_eq!(reader.maybe::<i64>("GONE").await.unwrap(), None);
        assert_eq!(
            reader.maybe::<Uuid>("BAD_UUID").await.unwrap_err().to_string(),
            "$BAD_UUID is not a UUID"
        );
    }

    #[tokio::test]
    async fn test_secret_enum() {
        let fixture = Fixture::new();
        fixture.explicit("LOG_LEVEL", "warn\n");
        fixture.explicit("BAD_LEVEL", "loud");

        let levels = ["debug", "info", "warn", "error"];
        let reader = fixture.reader();
        assert_eq!(reader.get_enum("LOG_LEVEL", &levels, None).await.unwrap(), "warn");
        assert_eq!(
            reader.get_enum("UNSET", &levels, Some("info")).await.unwrap(),
            "info"
        );
        assert_eq!(reader.maybe_enum("UNSET", &levels).await.unwrap(), None);
        assert_eq!(
            reader
                .get_enum("BAD_LEVEL", &levels, None)
                .await
                .unwrap_err()
                .to_string(),
            "$BAD_LEVEL is not one of debug, info, warn, error"
        );
    }

    #[tokio::test]
    async fn test_secret_string_is_redacted_in_debug() {
        let fixture = Fixture::new();
        fixture.explicit("PASSWORD", " s3cr3t ");

        let secret: SecretString = fixture.reader().get("PASSWORD", None).await.unwrap();
        assert_eq!(secret.expose_secret(), "s3cr3t");
        assert!(!format!("{secret:?}").contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_each_call_rereads_the_file() {
        let fixture = Fixture::new();
        let path = fixture.explicit("ROTATING", "1");
        let reader = fixture.reader();

        assert_eq!(reader.get::<i64>("ROTATING", None).await.unwrap(), 1);
        fs::write(&path, "2").unwrap();
        assert_eq!(reader.get::<i64>("ROTATING", None).await.unwrap(), 2);
    }
}
