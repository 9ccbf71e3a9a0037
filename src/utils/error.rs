use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimeTypeError {
    #[error("timetype: invalid clock")]
    InvalidClock,

    #[error("timetype: invalid duration")]
    InvalidDuration,

    #[error("timetype: invalid weekday")]
    InvalidWeekday,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    ClockParse(#[from] ParseClockError),

    #[error(transparent)]
    DurationParse(#[from] ParseDurationError),
}

/// Failure of the strict `15:04:05` clock layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseClockError {
    #[error("parsing time {value:?} as \"15:04:05\": cannot parse {rest:?} as {element:?}")]
    Layout {
        value: String,
        rest: String,
        element: &'static str,
    },

    #[error("parsing time {value:?}: {field} out of range")]
    OutOfRange { value: String, field: &'static str },

    #[error("parsing time {value:?}: extra text: {extra:?}")]
    ExtraText { value: String, extra: String },
}

/// Failure of the unit-suffixed duration grammar. Each variant carries the full input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {value:?}")]
    UnknownUnit { unit: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The value had the wrong shape for the target type.
    InvalidInput,
    /// The value had the right shape but malformed content.
    Parse,
    /// The input was not valid JSON.
    Syntax,
}

impl TimeTypeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TimeTypeError::InvalidClock
            | TimeTypeError::InvalidDuration
            | TimeTypeError::InvalidWeekday => ErrorCategory::InvalidInput,
            TimeTypeError::ClockParse(_) | TimeTypeError::DurationParse(_) => {
                ErrorCategory::Parse
            }
            TimeTypeError::Json(_) => ErrorCategory::Syntax,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.category() == ErrorCategory::InvalidInput
    }
}

pub type Result<T> = std::result::Result<T, TimeTypeError>;
