use crate::utils::error::{Result, TimeTypeError};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Days since Sunday.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

/// Looks up a weekday by its capitalized English name.
///
/// Matching is exact: `"sunday"`, `"SUNDAY"` and `"Sun"` are all
/// [`TimeTypeError::InvalidWeekday`].
pub fn parse_weekday(name: &str) -> Result<Weekday> {
    Weekday::ALL
        .into_iter()
        .find(|day| day.name() == name)
        .ok_or(TimeTypeError::InvalidWeekday)
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = TimeTypeError;

    fn from_str(s: &str) -> Result<Self> {
        parse_weekday(s)
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Sunday => chrono::Weekday::Sun,
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        Weekday::ALL[value.num_days_from_sunday() as usize]
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct WeekdayVisitor;

        impl Visitor<'_> for WeekdayVisitor {
            type Value = Weekday;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a capitalized English weekday name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Weekday, E> {
                parse_weekday(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(WeekdayVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_sunday_first() {
        for (i, day) in Weekday::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(day.ordinal()), i);
            assert_eq!(Weekday::from_ordinal(day.ordinal()), Some(day));
        }
        assert_eq!(Weekday::from_ordinal(7), None);
    }

    #[test]
    fn test_chrono_conversion() {
        for day in Weekday::ALL {
            let converted: chrono::Weekday = day.into();
            assert_eq!(converted.num_days_from_sunday(), u32::from(day.ordinal()));
            assert_eq!(Weekday::from(converted), day);
        }
    }
}
