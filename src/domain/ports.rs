use crate::domain::model::DbValue;
use crate::utils::error::Result;

/// Populates a value from a database driver result.
///
/// On error the target is left unchanged.
pub trait Scan {
    fn scan(&mut self, src: DbValue) -> Result<()>;
}

/// Produces the value handed to a database driver as a query parameter.
pub trait ToDbValue {
    fn to_db_value(&self) -> Result<DbValue>;
}
