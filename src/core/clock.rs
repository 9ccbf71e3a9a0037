use crate::domain::model::{DbValue, Location};
use crate::domain::ports::{Scan, ToDbValue};
use crate::utils::error::{ParseClockError, Result, TimeTypeError};
use chrono::{DateTime, FixedOffset, Local, NaiveTime, Timelike, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;

/// Wall-clock time of day with second resolution, in a given location.
///
/// Text and JSON forms are `HH:MM:SS` and carry no location, so a clock read back
/// from text is always in [`Location::Utc`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Clock {
    hour: u8,
    minute: u8,
    second: u8,
    location: Location,
}

impl Clock {
    /// Components outside their usual range roll over, so `Clock::new(25, 0, 0, loc)`
    /// is `01:00:00` and a negative second counts back from midnight.
    pub fn new(hour: i32, minute: i32, second: i32, location: Location) -> Self {
        let total = (i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second))
            .rem_euclid(SECONDS_PER_DAY);
        Self::from_seconds(total as u32, location)
    }

    pub fn utc(hour: i32, minute: i32, second: i32) -> Self {
        Self::new(hour, minute, second, Location::Utc)
    }

    fn from_seconds(secs: u32, location: Location) -> Self {
        Clock {
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
            location,
        }
    }

    fn from_timelike<T: Timelike>(t: &T, location: Location) -> Self {
        Self::from_seconds(t.num_seconds_from_midnight(), location)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn with_location(self, location: Location) -> Self {
        Clock { location, ..self }
    }

    pub fn seconds_from_midnight(&self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }

    /// `HH:MM:SS`, 24-hour, zero padded. The location is not rendered.
    pub fn format(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
        .unwrap_or_default()
    }

    /// Encodes the clock as a JSON string literal, e.g. `"19:24:00"`.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.format())?)
    }

    /// Decodes a JSON string literal in `HH:MM:SS` form.
    ///
    /// Malformed JSON surfaces the [`serde_json::Error`], any JSON value other than a
    /// string is [`TimeTypeError::InvalidClock`], and a string that does not fit the
    /// layout surfaces the [`ParseClockError`].
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::String(text) => Ok(text.parse::<Clock>()?),
            other => {
                tracing::debug!(json = %other, "rejected non-string clock");
                Err(TimeTypeError::InvalidClock)
            }
        }
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format(), self.location)
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clock::new({}, {}, {}, {})",
            self.hour, self.minute, self.second, self.location
        )
    }
}

impl FromStr for Clock {
    type Err = ParseClockError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (hour, minute, second) = parse_clock(s)?;
        Ok(Clock {
            hour,
            minute,
            second,
            location: Location::Utc,
        })
    }
}

/// Parses the `15:04:05` layout: hour of one or two digits, minute and second of
/// exactly two, each range checked as soon as it is read.
fn parse_clock(value: &str) -> std::result::Result<(u8, u8, u8), ParseClockError> {
    let layout = |rest: &str, element: &'static str| ParseClockError::Layout {
        value: value.to_string(),
        rest: rest.to_string(),
        element,
    };
    let out_of_range = |field: &'static str| ParseClockError::OutOfRange {
        value: value.to_string(),
        field,
    };

    let (hour, rest) = take_number(value, false).ok_or_else(|| layout(value, "15"))?;
    if hour > 23 {
        return Err(out_of_range("hour"));
    }
    let rest = rest.strip_prefix(':').ok_or_else(|| layout(rest, ":"))?;

    let (minute, after) = take_number(rest, true).ok_or_else(|| layout(rest, "04"))?;
    if minute > 59 {
        return Err(out_of_range("minute"));
    }
    let rest = after.strip_prefix(':').ok_or_else(|| layout(after, ":"))?;

    let (second, after) = take_number(rest, true).ok_or_else(|| layout(rest, "05"))?;
    if second > 59 {
        return Err(out_of_range("second"));
    }

    let rest = skip_fraction(after);
    if !rest.is_empty() {
        return Err(ParseClockError::ExtraText {
            value: value.to_string(),
            extra: rest.to_string(),
        });
    }

    Ok((hour, minute, second))
}

/// Reads one or two leading ASCII digits, exactly two when `fixed`.
fn take_number(s: &str, fixed: bool) -> Option<(u8, &str)> {
    let bytes = s.as_bytes();
    let first = *bytes.first().filter(|b| b.is_ascii_digit())? - b'0';
    match bytes.get(1) {
        Some(b) if b.is_ascii_digit() => Some((first * 10 + (b - b'0'), &s[2..])),
        _ if fixed => None,
        _ => Some((first, &s[1..])),
    }
}

// Sub-second digits are accepted after the seconds field and dropped.
fn skip_fraction(s: &str) -> &str {
    match s.strip_prefix('.') {
        Some(frac) if frac.starts_with(|c: char| c.is_ascii_digit()) => {
            frac.trim_start_matches(|c: char| c.is_ascii_digit())
        }
        _ => s,
    }
}

impl From<NaiveTime> for Clock {
    fn from(value: NaiveTime) -> Self {
        Clock::from_timelike(&value, Location::Utc)
    }
}

impl From<DateTime<Utc>> for Clock {
    fn from(value: DateTime<Utc>) -> Self {
        Clock::from_timelike(&value, Location::Utc)
    }
}

impl From<DateTime<FixedOffset>> for Clock {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Clock::from_timelike(&value, Location::fixed(*value.offset()))
    }
}

impl From<DateTime<Local>> for Clock {
    fn from(value: DateTime<Local>) -> Self {
        Clock::from_timelike(&value, Location::Local)
    }
}

impl Serialize for Clock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Clock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ClockVisitor;

        impl Visitor<'_> for ClockVisitor {
            type Value = Clock;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a clock string in HH:MM:SS form")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Clock, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ClockVisitor)
    }
}

impl Scan for Clock {
    fn scan(&mut self, src: DbValue) -> Result<()> {
        tracing::trace!(source = src.kind(), "scanning clock");
        *self = match src {
            DbValue::Null => Clock::default(),
            DbValue::Time(time) => Clock::from(time),
            DbValue::Timestamp(timestamp) => Clock::from(timestamp),
            DbValue::Text(text) => Clock::from_json(text.as_bytes())?,
            DbValue::Bytes(bytes) => Clock::from_json(&bytes)?,
            other => {
                tracing::debug!(source = other.kind(), "unsupported database value for clock");
                return Err(TimeTypeError::InvalidClock);
            }
        };
        Ok(())
    }
}

impl ToDbValue for Clock {
    fn to_db_value(&self) -> Result<DbValue> {
        Ok(DbValue::Bytes(self.to_json()?))
    }
}
