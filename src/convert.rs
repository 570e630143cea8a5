//! String → value conversions used by the typed accessors.
//!
//! Every function here is pure: it takes an already-interpolated string and
//! either returns the converted value or a [`ConvertError`] carrying the
//! offending input. The accessors in [`accessors`](crate::accessors) attach
//! the section and option name before handing the error to the caller.

use std::path::PathBuf;
use std::time::Duration;

use bytesize::ByteSize;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Not a boolean: {0}")]
    InvalidBoolean(String),

    #[error("Not a number: '{0}'")]
    InvalidNumber(String),

    #[error("Not a size: '{0}'")]
    InvalidSize(String),

    #[error("Not a duration: '{value}' ({reason})")]
    InvalidDuration { value: String, reason: String },

    #[error("Not a date/time: '{0}'")]
    InvalidDate(String),

    #[error("Not a timespan: '{value}' ({reason})")]
    InvalidTimespan { value: String, reason: String },
}

/// Parse an integer.
///
/// With `base == 0` the radix comes from the literal itself: `0x`, `0o` and
/// `0b` prefixes select 16, 8 and 2, anything else is decimal (and must not
/// carry leading zeros). An explicit base accepts its own prefix as well.
/// Single underscores between digits are allowed.
pub fn parse_int(value: &str, base: u32) -> Result<i64, ConvertError> {
    let invalid = || ConvertError::InvalidNumber(value.to_string());

    if base == 1 || base > 36 {
        return Err(invalid());
    }

    let trimmed = value.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let prefix = body.get(..2).map(str::to_ascii_lowercase);
    let prefixed_radix = match prefix.as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };

    fn after_prefix(literal: &str) -> &str {
        let digits = &literal[2..];
        digits.strip_prefix('_').unwrap_or(digits)
    }

    let (radix, digits) = match (base, prefixed_radix) {
        (0, Some(radix)) => (radix, after_prefix(body)),
        (0, None) => {
            let significant = body.trim_start_matches(['0', '_']);
            if body.starts_with('0') && !significant.is_empty() {
                return Err(invalid());
            }
            (10, body)
        }
        (base, Some(radix)) if base == radix => (radix, after_prefix(body)),
        (base, _) => (base, body),
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(invalid());
    }

    let mut cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if negative {
        cleaned.insert(0, '-');
    }
    i64::from_str_radix(&cleaned, radix).map_err(|_| invalid())
}

/// Parse a floating point number (`1.5`, `1e3`, `inf`).
pub fn parse_float(value: &str) -> Result<f64, ConvertError> {
    value
        .trim()
        .replace('_', "")
        .parse::<f64>()
        .map_err(|_| ConvertError::InvalidNumber(value.to_string()))
}

/// Parse a boolean token, case-insensitively.
pub fn parse_bool(value: &str) -> Result<bool, ConvertError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(ConvertError::InvalidBoolean(value.to_string())),
    }
}

/// Wrap a string as a filesystem path.
pub fn parse_path(value: &str) -> Result<PathBuf, ConvertError> {
    Ok(PathBuf::from(value))
}

/// Identity conversion, the default element converter for lists and sets.
pub fn parse_string(value: &str) -> Result<String, ConvertError> {
    Ok(value.to_string())
}

/// Split a list value.
///
/// Without a separator the value is split on runs of whitespace; with one,
/// on every occurrence of it. Elements are trimmed. An empty value is an
/// empty list.
pub fn split_list<'a>(value: &'a str, sep: Option<&str>) -> Vec<&'a str> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    match sep {
        None => value.split_whitespace().collect(),
        Some(sep) => value.split(sep).map(str::trim).collect(),
    }
}

// Spelled-out unit names and the symbol `bytesize` reads for each.
const UNIT_NAMES: [(&str, &str); 11] = [
    ("byte", "B"),
    ("kilobyte", "KB"),
    ("kibibyte", "KiB"),
    ("megabyte", "MB"),
    ("mebibyte", "MiB"),
    ("gigabyte", "GB"),
    ("gibibyte", "GiB"),
    ("terabyte", "TB"),
    ("tebibyte", "TiB"),
    ("petabyte", "PB"),
    ("pebibyte", "PiB"),
];

fn unit_symbol(unit: &str) -> &str {
    let lower = unit.to_lowercase();
    let singular = lower.strip_suffix('s').unwrap_or(&lower);
    UNIT_NAMES
        .iter()
        .find(|(name, _)| *name == singular)
        .map_or(unit, |(_, symbol)| symbol)
}

/// Parse a human-readable size such as `100 MiB` or `1.5 GB` into bytes.
///
/// IEC units (`KiB`, `MiB`, …) are powers of 1024, SI units (`KB`, `MB`,
/// and the bare letters `K`, `M`, …) powers of 1000, up to peta. Units are
/// case-insensitive and may be spelled out (`2 gibibytes`). A bare number
/// is a byte count.
pub fn parse_size(value: &str) -> Result<u64, ConvertError> {
    let invalid = || ConvertError::InvalidSize(value.to_string());

    let text = value.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let unit = unit.trim();
    if number.is_empty() {
        return Err(invalid());
    }
    if unit.is_empty() {
        return number.parse().map_err(|_| invalid());
    }

    let size: ByteSize = format!("{number} {}", unit_symbol(unit))
        .parse()
        .map_err(|_| invalid())?;
    // Out-of-range products saturate.
    match size.as_u64() {
        u64::MAX => Err(invalid()),
        bytes => Ok(bytes),
    }
}

/// Parse a duration: a bare number of seconds (`60`, `2.5`) or a compact
/// expression understood by `humantime` (`10s`, `5m`, `1h 30m`).
pub fn parse_duration(value: &str) -> Result<Duration, ConvertError> {
    let text = value.trim();
    let invalid = |reason: String| ConvertError::InvalidDuration {
        value: value.to_string(),
        reason,
    };

    if text.is_empty() {
        return Err(invalid("empty value".into()));
    }
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    if let Ok(secs) = text.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|e| invalid(e.to_string()));
    }
    humantime::parse_duration(text).map_err(|e| invalid(e.to_string()))
}

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M %z",
];

const DATETIME_FORMATS: [&str; 14] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%b %d %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M %p",
    "%d %B %Y %H:%M",
];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%b %d %Y", "%d %b %Y", "%B %d, %Y", "%d %B %Y",
];

/// Parse a date/time expression.
///
/// Accepted forms:
///
/// | Form | Example |
/// |------|---------|
/// | RFC 3339 | `2023-06-01T12:30:15+02:00` |
/// | ISO-like, optional seconds and fraction | `2023-06-01 12:30:15.250`, `2023-06-01T12:30` |
/// | ISO-like with a numeric offset | `2023-06-01 12:30:15 +0200` |
/// | 12-hour clock | `2023-06-01 3:30 pm`, `June 1, 2023 3:30 PM` |
/// | Slashed | `2023/06/01 12:30` |
/// | Month names (full or short) | `Jun 01 2023 12:30:15`, `1 June 2023 12:30` |
/// | Bare date, meaning midnight | `2023-06-01`, `June 1, 2023`, `1 Jun 2023` |
///
/// Offsets are converted to UTC. Times without an offset are taken as-is.
/// Relative expressions (`tomorrow`) and hour-only times (`3pm`) are not
/// accepted.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, ConvertError> {
    let text = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.naive_utc());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    Err(ConvertError::InvalidDate(value.to_string()))
}
