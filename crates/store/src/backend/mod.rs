//! Storage engines implementing [`RecordStore`](crate::RecordStore).

mod postgres;
mod sqlite;

pub use self::postgres::PostgresStore;
pub use self::sqlite::SqliteStore;

use crate::error::{ErrorKind, Result};

/// Check that a delete affected exactly one row.
pub(crate) fn expect_one_row(rows_affected: u64) -> Result<()> {
    match rows_affected {
        0 => exn::bail!(ErrorKind::NotFound),
        1 => Ok(()),
        n => exn::bail!(ErrorKind::Integrity(n)),
    }
}
