//! Time-of-day, duration and weekday value types that convert cleanly across JSON
//! and database driver boundaries.

pub mod core;
pub mod domain;
pub mod utils;

pub use crate::core::{
    clock::Clock,
    duration::Duration,
    weekday::{parse_weekday, Weekday},
};
pub use crate::domain::model::{DbValue, Location};
pub use crate::domain::ports::{Scan, ToDbValue};
pub use crate::utils::error::{
    ErrorCategory, ParseClockError, ParseDurationError, Result, TimeTypeError,
};
