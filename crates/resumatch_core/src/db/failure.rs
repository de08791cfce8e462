//! Constraint classification for failed SQLite writes.
//!
//! # Invariants
//! - Classification only looks at SQLite result codes, never at message text.
//! - Anything not recognised as a constraint class is `Other`.

use rusqlite::ffi::ErrorCode;
use std::os::raw::c_int;

const SQLITE_CONSTRAINT_CHECK: c_int = 275;
const SQLITE_CONSTRAINT_NOTNULL: c_int = 1299;
const SQLITE_CONSTRAINT_PRIMARYKEY: c_int = 1555;
const SQLITE_CONSTRAINT_UNIQUE: c_int = 2067;
const SQLITE_CONSTRAINT_DATATYPE: c_int = 3091;

/// Constraint class of a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// A row with the same unique key already exists.
    UniqueViolation,
    /// A required column was given no value.
    NotNullViolation,
    /// A value does not match the declared column type.
    TypeViolation,
    /// A `CHECK` constraint rejected the row.
    CheckViolation,
    /// Any other failure, including foreign-key violations and I/O errors.
    Other,
}

impl WriteFailure {
    /// Maps one rusqlite error to its constraint class.
    pub fn classify(err: &rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(inner, _) => match inner.code {
                ErrorCode::ConstraintViolation => match inner.extended_code {
                    SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                        Self::UniqueViolation
                    }
                    SQLITE_CONSTRAINT_NOTNULL => Self::NotNullViolation,
                    SQLITE_CONSTRAINT_DATATYPE => Self::TypeViolation,
                    SQLITE_CONSTRAINT_CHECK => Self::CheckViolation,
                    _ => Self::Other,
                },
                ErrorCode::TypeMismatch => Self::TypeViolation,
                _ => Self::Other,
            },
            rusqlite::Error::ToSqlConversionFailure(_) => Self::TypeViolation,
            _ => Self::Other,
        }
    }

    /// Returns whether the input data, not the store, caused the failure.
    pub fn is_bad_input(self) -> bool {
        matches!(
            self,
            Self::NotNullViolation | Self::TypeViolation | Self::CheckViolation
        )
    }

    pub(crate) fn is_interrupt(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::OperationInterrupted
        )
    }

    /// Short description used in error messages and log lines.
    pub fn describe(self) -> &'static str {
        match self {
            Self::UniqueViolation => "unique constraint violated",
            Self::NotNullViolation => "required value is missing",
            Self::TypeViolation => "value has the wrong data type",
            Self::CheckViolation => "value violates a check constraint",
            Self::Other => "unclassified store failure",
        }
    }
}
