pub mod clock;
pub mod duration;
pub mod weekday;

pub use crate::domain::model::{DbValue, Location};
pub use crate::domain::ports::{Scan, ToDbValue};
pub use crate::utils::error::Result;
