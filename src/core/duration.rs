use crate::domain::model::DbValue;
use crate::domain::ports::{Scan, ToDbValue};
use crate::utils::error::{ParseDurationError, Result, TimeTypeError};
use chrono::TimeDelta;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

// Largest magnitude the grammar accepts; only reachable as a negative value.
const MAGNITUDE_LIMIT: u64 = 1 << 63;

/// Signed elapsed time in nanoseconds.
///
/// Encodes as a unit-suffixed string such as `1h5m3s` or `500ms`, and decodes from
/// that string or from a raw nanosecond count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Duration = Duration(0);
    pub const NANOSECOND: Duration = Duration(1);
    pub const MICROSECOND: Duration = Duration(1_000);
    pub const MILLISECOND: Duration = Duration(1_000_000);
    pub const SECOND: Duration = Duration(1_000_000_000);
    pub const MINUTE: Duration = Duration(60 * 1_000_000_000);
    pub const HOUR: Duration = Duration(3_600 * 1_000_000_000);

    pub const fn from_nanos(nanos: i64) -> Self {
        Duration(nanos)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Duration(secs.saturating_mul(1_000_000_000))
    }

    /// Truncates toward zero. Values beyond the `i64` range saturate and NaN is zero.
    pub fn from_nanos_f64(nanos: f64) -> Self {
        Duration(nanos as i64)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// `None` for negative durations.
    pub fn to_std(self) -> Option<std::time::Duration> {
        u64::try_from(self.0).ok().map(std::time::Duration::from_nanos)
    }

    /// Encodes the duration as a quoted unit-suffixed JSON string.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_string())?)
    }

    /// Decodes a JSON number of nanoseconds or a JSON string in the unit-suffixed
    /// grammar. Any other JSON value is [`TimeTypeError::InvalidDuration`].
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Number(number) => Ok(Duration::from_json_number(&number)),
            Value::String(text) => Ok(text.parse::<Duration>()?),
            other => {
                tracing::debug!(json = %other, "rejected non-numeric, non-string duration");
                Err(TimeTypeError::InvalidDuration)
            }
        }
    }

    fn from_json_number(number: &Number) -> Self {
        match number.as_i64() {
            Some(nanos) => Duration(nanos),
            None => Duration::from_nanos_f64(number.as_f64().unwrap_or_default()),
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

fn format_duration(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }

    let sign = if nanos < 0 { "-" } else { "" };
    let magnitude = nanos.unsigned_abs();

    if magnitude < NANOS_PER_SECOND {
        let (precision, unit) = match magnitude {
            1..=999 => (0, "ns"),
            1_000..=999_999 => (3, "\u{b5}s"),
            _ => (6, "ms"),
        };
        let (whole, fraction) = split_fraction(magnitude, precision);
        return format!("{sign}{whole}{fraction}{unit}");
    }

    let (secs, fraction) = split_fraction(magnitude, 9);
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}{fraction}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}{fraction}s")
    } else {
        format!("{sign}{seconds}{fraction}s")
    }
}

/// Splits off the lowest `precision` decimal digits of `value`, rendering them as
/// `.ddd` with trailing zeros removed (empty when all are zero).
fn split_fraction(mut value: u64, precision: u32) -> (u64, String) {
    let mut digits = Vec::new();
    for _ in 0..precision {
        let digit = (value % 10) as u8;
        if digit != 0 || !digits.is_empty() {
            digits.push(char::from(b'0' + digit));
        }
        value /= 10;
    }
    if digits.is_empty() {
        return (value, String::new());
    }
    let fraction = std::iter::once('.').chain(digits.into_iter().rev()).collect();
    (value, fraction)
}

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_duration(s).map(Duration)
    }
}

/// Parses `[-+]?(number unit)+` where number is `digits[.digits]` and unit is one of
/// `ns`, `us`, `µs`, `μs`, `ms`, `s`, `m`, `h`. A lone `0` needs no unit.
fn parse_duration(input: &str) -> std::result::Result<i64, ParseDurationError> {
    let invalid = || ParseDurationError::Invalid(input.to_string());

    let (negative, mut s) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    if s == "0" {
        return Ok(0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        if !s.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, rest) = leading_int(s).ok_or_else(invalid)?;
        let has_whole = rest.len() != s.len();
        s = rest;

        let mut fraction = (0, 1.0);
        let mut has_fraction = false;
        if let Some(after_dot) = s.strip_prefix('.') {
            let (digits, scale, rest) = leading_fraction(after_dot);
            has_fraction = rest.len() != after_dot.len();
            fraction = (digits, scale);
            s = rest;
        }
        if !has_whole && !has_fraction {
            return Err(invalid());
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(ParseDurationError::MissingUnit(input.to_string()));
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        let unit_nanos = unit_nanos(unit).ok_or_else(|| ParseDurationError::UnknownUnit {
            unit: unit.to_string(),
            value: input.to_string(),
        })?;

        if whole > MAGNITUDE_LIMIT / unit_nanos {
            return Err(invalid());
        }
        let mut value = whole * unit_nanos;
        let (digits, scale) = fraction;
        if digits > 0 {
            value += (digits as f64 * (unit_nanos as f64 / scale)) as u64;
            if value > MAGNITUDE_LIMIT {
                return Err(invalid());
            }
        }

        total = total
            .checked_add(value)
            .filter(|t| *t <= MAGNITUDE_LIMIT)
            .ok_or_else(invalid)?;
    }

    if negative {
        return Ok((total as i64).wrapping_neg());
    }
    if total >= MAGNITUDE_LIMIT {
        return Err(invalid());
    }
    Ok(total as i64)
}

fn leading_int(s: &str) -> Option<(u64, &str)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut value: u64 = 0;
    for b in s[..len].bytes() {
        if value > MAGNITUDE_LIMIT / 10 {
            return None;
        }
        value = value * 10 + u64::from(b - b'0');
        if value > MAGNITUDE_LIMIT {
            return None;
        }
    }
    Some((value, &s[len..]))
}

// Digits past the representable precision are consumed and ignored.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut value: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    for b in s[..len].bytes() {
        if overflow {
            continue;
        }
        if value > (MAGNITUDE_LIMIT - 1) / 10 {
            overflow = true;
            continue;
        }
        let next = value * 10 + u64::from(b - b'0');
        if next > MAGNITUDE_LIMIT {
            overflow = true;
            continue;
        }
        value = next;
        scale *= 10.0;
    }
    (value, scale, &s[len..])
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3_600 * NANOS_PER_SECOND),
        _ => None,
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration(-self.0)
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration(self.0 * rhs)
    }
}

impl TryFrom<TimeDelta> for Duration {
    type Error = TimeTypeError;

    fn try_from(value: TimeDelta) -> Result<Self> {
        value
            .num_nanoseconds()
            .map(Duration)
            .ok_or(TimeTypeError::InvalidDuration)
    }
}

impl From<Duration> for TimeDelta {
    fn from(value: Duration) -> Self {
        TimeDelta::nanoseconds(value.0)
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = TimeTypeError;

    fn try_from(value: std::time::Duration) -> Result<Self> {
        i64::try_from(value.as_nanos())
            .map(Duration)
            .map_err(|_| TimeTypeError::InvalidDuration)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DurationVisitor;

        impl Visitor<'_> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a duration string like \"1h5m3s\" or a nanosecond count")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Duration, E> {
                Ok(Duration(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Duration, E> {
                Ok(Duration(i64::try_from(v).unwrap_or(i64::MAX)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Duration, E> {
                Ok(Duration::from_nanos_f64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Duration, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

impl Scan for Duration {
    fn scan(&mut self, src: DbValue) -> Result<()> {
        tracing::trace!(source = src.kind(), "scanning duration");
        *self = match src {
            DbValue::Null => Duration::ZERO,
            DbValue::Interval(delta) => Duration::try_from(delta)?,
            DbValue::Float(nanos) => Duration::from_nanos_f64(nanos),
            DbValue::Int(nanos) => Duration(nanos),
            DbValue::Text(text) => Duration::from_json(text.as_bytes())?,
            DbValue::Bytes(bytes) => Duration::from_json(&bytes)?,
            other => {
                tracing::debug!(source = other.kind(), "unsupported database value for duration");
                return Err(TimeTypeError::InvalidDuration);
            }
        };
        Ok(())
    }
}

impl ToDbValue for Duration {
    fn to_db_value(&self) -> Result<DbValue> {
        Ok(DbValue::Bytes(self.to_json()?))
    }
}
