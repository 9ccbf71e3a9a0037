use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta};
use std::fmt;

/// Time-zone identifier carried by a [`Clock`](crate::Clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    #[default]
    Utc,
    Local,
    /// Never holds a zero offset, see [`Location::fixed`].
    Fixed(FixedOffset),
}

impl Location {
    pub fn fixed(offset: FixedOffset) -> Self {
        if offset.local_minus_utc() == 0 {
            Location::Utc
        } else {
            Location::Fixed(offset)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Utc => f.write_str("UTC"),
            Location::Local => f.write_str("Local"),
            Location::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// A value exchanged with a database driver, either as a query parameter or a
/// column result.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Time(NaiveTime),
    Timestamp(DateTime<FixedOffset>),
    Interval(TimeDelta),
}

impl DbValue {
    pub fn kind(&self) -> &'static str {
        match self {
            DbValue::Null => "null",
            DbValue::Bool(_) => "bool",
            DbValue::Int(_) => "int",
            DbValue::Float(_) => "float",
            DbValue::Text(_) => "text",
            DbValue::Bytes(_) => "bytes",
            DbValue::Time(_) => "time",
            DbValue::Timestamp(_) => "timestamp",
            DbValue::Interval(_) => "interval",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }
}

impl From<bool> for DbValue {
    fn from(value: bool) -> Self {
        DbValue::Bool(value)
    }
}

impl From<i64> for DbValue {
    fn from(value: i64) -> Self {
        DbValue::Int(value)
    }
}

impl From<f64> for DbValue {
    fn from(value: f64) -> Self {
        DbValue::Float(value)
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_string())
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl From<&[u8]> for DbValue {
    fn from(value: &[u8]) -> Self {
        DbValue::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for DbValue {
    fn from(value: Vec<u8>) -> Self {
        DbValue::Bytes(value)
    }
}

impl From<NaiveTime> for DbValue {
    fn from(value: NaiveTime) -> Self {
        DbValue::Time(value)
    }
}

impl From<DateTime<FixedOffset>> for DbValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        DbValue::Timestamp(value)
    }
}

impl From<TimeDelta> for DbValue {
    fn from(value: TimeDelta) -> Self {
        DbValue::Interval(value)
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DbValue::Null, Into::into)
    }
}
