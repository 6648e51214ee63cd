//! Conversion of raw configuration strings into typed values.
//!
//! Responsibilities:
//! - Define the `EnvValue` trait: coerce a trimmed raw string into a value and
//!   render a value back to its canonical raw form.
//! - Implement it for booleans, integers, floats, strings, string lists, URLs,
//!   UUIDs, dates and secret strings.
//! - Provide the standalone coercers (`to_bool`, `to_int`, ...) and the
//!   enumeration guard (`is_enum`, `to_enum`).
//!
//! Does NOT handle:
//! - Reading the environment or secret files (see `accessor.rs`, `secret.rs`).
//!
//! Invariants:
//! - Coercers are pure and never panic.
//! - Numbers parse the longest numeric prefix; trailing text is ignored and
//!   only an empty prefix fails (`"42abc"` is `42`).
//! - Booleans accept exactly `true` and `false`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use url::Url;
use uuid::Uuid;

use crate::constants::LIST_SEPARATOR;
use crate::error::{EnvError, RawValue, Result};

/// Where a raw value came from; decides whether it may appear in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Env,
    Secret,
}

impl Origin {
    pub(crate) fn raw(self, value: &str) -> RawValue {
        match self {
            Self::Env => RawValue::Shown(value.to_string()),
            Self::Secret => RawValue::Redacted,
        }
    }
}

/// A value that can be read from a configuration string.
pub trait EnvValue: Sized {
    /// Convert a trimmed, non-blank raw string.
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self>;

    /// Canonical raw form; fallbacks are re-read through `coerce` using it.
    fn to_raw(&self) -> String;
}

impl EnvValue for bool {
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self> {
        match raw {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(EnvError::NotABoolean {
                key: key.to_string(),
                raw: origin.raw(raw),
            }),
        }
    }

    fn to_raw(&self) -> String {
        self.to_string()
    }
}

impl EnvValue for i64 {
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self> {
        parse_leading_int(raw).ok_or_else(|| EnvError::NotANumber {
            key: key.to_string(),
            raw: origin.raw(raw),
        })
    }

    fn to_raw(&self) -> String {
        self.to_string()
    }
}

impl EnvValue for f64 {
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self> {
        parse_leading_float(raw).ok_or_else(|| EnvError::NotANumber {
            key: key.to_string(),
            raw: origin.raw(raw),
        })
    }

    fn to_raw(&self) -> String {
        if self.is_infinite() {
            let sign = if self.is_sign_negative() { "-" } else { "" };
            format!("{sign}Infinity")
        } else {
            self.to_string()
        }
    }
}

impl EnvValue for String {
    fn coerce(key: &str, raw: &str, _origin: Origin) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EnvError::missing(key));
        }
        Ok(trimmed.to_string())
    }

    fn to_raw(&self) -> String {
        self.clone()
    }
}

impl EnvValue for SecretString {
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self> {
        String::coerce(key, raw, origin).map(|value| SecretString::new(value.into()))
    }

    fn to_raw(&self) -> String {
        self.expose_secret().to_string()
    }
}

impl EnvValue for Vec<String> {
    fn coerce(_key: &str, raw: &str, _origin: Origin) -> Result<Self> {
        Ok(to_strings(raw))
    }

    fn to_raw(&self) -> String {
        self.join(&LIST_SEPARATOR.to_string())
    }
}

impl EnvValue for Url {
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self> {
        Url::parse(raw).map_err(|source| EnvError::NotAUrl {
            key: key.to_string(),
            raw: origin.raw(raw),
            source,
        })
    }

    fn to_raw(&self) -> String {
        self.to_string()
    }
}

impl EnvValue for Uuid {
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self> {
        let invalid = || EnvError::NotAUuid {
            key: key.to_string(),
            raw: origin.raw(raw),
        };
        if !is_uuid(raw) {
            return Err(invalid());
        }
        Uuid::parse_str(raw).map_err(|_| invalid())
    }

    fn to_raw(&self) -> String {
        self.hyphenated().to_string()
    }
}

impl EnvValue for DateTime<Utc> {
    fn coerce(key: &str, raw: &str, origin: Origin) -> Result<Self> {
        parse_date(raw).ok_or_else(|| EnvError::NotAValidDate {
            key: key.to_string(),
            raw: origin.raw(raw),
        })
    }

    fn to_raw(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Convert `value` to a boolean.
pub fn to_bool(key: &str, value: &str) -> Result<bool> {
    bool::coerce(key, value, Origin::Env)
}

/// Convert the leading integer portion of `value`.
pub fn to_int(key: &str, value: &str) -> Result<i64> {
    i64::coerce(key, value, Origin::Env)
}

/// Convert the leading floating-point portion of `value`.
pub fn to_float(key: &str, value: &str) -> Result<f64> {
    f64::coerce(key, value, Origin::Env)
}

/// Parse `value` as an absolute URL.
pub fn to_url(key: &str, value: &str) -> Result<Url> {
    Url::coerce(key, value, Origin::Env)
}

/// Parse `value` as a UUID accepted by `is_uuid`.
pub fn to_uuid(key: &str, value: &str) -> Result<Uuid> {
    Uuid::coerce(key, value, Origin::Env)
}

/// Parse `value` as a UTC timestamp.
pub fn to_date(key: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::coerce(key, value, Origin::Env)
}

/// Split a comma separated list, trimming elements and dropping empty ones.
pub fn to_strings(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns true when `value` is one of `allowed`.
pub fn is_enum(value: &str, allowed: &[&str]) -> bool {
    allowed.contains(&value)
}

/// Return the member of `allowed` equal to `value`.
pub fn to_enum<'a>(key: &str, value: &str, allowed: &[&'a str]) -> Result<&'a str> {
    coerce_enum(key, value, allowed, Origin::Env)
}

pub(crate) fn coerce_enum<'a>(
    key: &str,
    value: &str,
    allowed: &[&'a str],
    origin: Origin,
) -> Result<&'a str> {
    allowed
        .iter()
        .copied()
        .find(|member| *member == value)
        .ok_or_else(|| EnvError::NotOneOf {
            key: key.to_string(),
            allowed: allowed.iter().map(|member| member.to_string()).collect(),
            raw: origin.raw(value),
        })
}

const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";
const MAX_UUID: &str = "ffffffff-ffff-ffff-ffff-ffffffffffff";

/// Returns true for hyphenated UUIDs with version 1-8 and RFC 4122 variant,
/// or the nil and max UUIDs. Case-insensitive.
pub fn is_uuid(value: &str) -> bool {
    if value.eq_ignore_ascii_case(NIL_UUID) || value.eq_ignore_ascii_case(MAX_UUID) {
        return true;
    }

    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }

    let grouped = bytes.iter().enumerate().all(|(index, byte)| match index {
        8 | 13 | 18 | 23 => *byte == b'-',
        _ => byte.is_ascii_hexdigit(),
    });

    grouped
        && matches!(bytes[14], b'1'..=b'8')
        && matches!(bytes[19].to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b')
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let (negative, rest) = split_sign(text);
    let (radix, digits) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = i128::from_str_radix(&digits[..end], radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

fn parse_leading_float(text: &str) -> Option<f64> {
    let (negative, rest) = split_sign(text);
    let sign = if negative { -1.0 } else { 1.0 };

    if rest.starts_with("Infinity") {
        return Some(sign * f64::INFINITY);
    }

    let bytes = rest.as_bytes();
    let count_digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let integer = count_digits(0);
    let mut end = integer;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = count_digits(end + 1);
        end += 1 + fraction;
    }
    if integer == 0 && fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut cursor = end + 1;
        if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
            cursor += 1;
        }
        let exponent = count_digits(cursor);
        if exponent > 0 {
            end = cursor + exponent;
        }
    }

    rest[..end].parse::<f64>().ok().map(|value| sign * value)
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    // `%Y` also reads the signed years RFC 3339 cannot hold (`+10000-01-01T00:00:00Z`).
    let local = text.strip_suffix('Z').unwrap_or(text);
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(local, format).ok())
    {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
