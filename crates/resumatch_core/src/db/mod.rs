//! SQLite storage bootstrap, schema migrations and write-failure classification.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the job-board core.
//! - Apply schema migrations in deterministic order.
//! - Translate raw SQLite failures into the constraint classes repositories
//!   branch on.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.

use crate::context::CancelReason;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod failure;
pub mod migrations;
mod open;
mod sql;

pub use failure::WriteFailure;
pub use open::{open_db, open_db_in_memory, open_db_with_config};
pub(crate) use open::FOLD_CASE_FUNCTION;
pub(crate) use sql::{guarded, placeholder_list};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The caller's cancel token fired before or during a store call.
    Cancelled(CancelReason),
}

impl DbError {
    /// Classifies this failure for write paths that branch on constraint type.
    pub fn write_failure(&self) -> WriteFailure {
        match self {
            Self::Sqlite(err) => WriteFailure::classify(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Cancelled(_) => WriteFailure::Other,
        }
    }

    /// Returns whether the store call was abandoned because of cancellation.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Cancelled(_) => true,
            Self::Sqlite(err) => WriteFailure::is_interrupt(err),
            Self::UnsupportedSchemaVersion { .. } => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Cancelled(reason) => write!(f, "store call abandoned: {reason}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Cancelled(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
