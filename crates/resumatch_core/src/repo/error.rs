//! Repository error taxonomy.
//!
//! # Invariants
//! - Every repository failure maps to exactly one `ErrorKind`.
//! - `BadRequest` always means the store rejected caller input; it is never
//!   retried.
//! - `Internal` keeps the underlying store failure as its source for
//!   diagnostics; callers must not expose it to end users.

use crate::db::{DbError, WriteFailure};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse failure class callers translate into transport responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    BadRequest,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::BadRequest => "bad_request",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    /// A point lookup by id found nothing.
    NotFound(String),
    /// Reserved for callers that treat duplicates as conflicts.
    AlreadyExists(String),
    /// The store rejected the input (missing value, wrong type, check).
    BadRequest(String),
    /// Unexpected store failure or failed transaction step.
    Internal {
        context: String,
        source: Option<DbError>,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn internal(context: impl Into<String>, source: impl Into<DbError>) -> Self {
        Self::Internal {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn internal_message(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
            source: None,
        }
    }

    /// Maps a failed write to `BadRequest` for input-caused constraint
    /// violations and to `Internal` for everything else.
    pub(crate) fn from_failed_write(context: impl Into<String>, err: DbError) -> Self {
        let failure = err.write_failure();
        let context = context.into();
        if failure.is_bad_input() {
            return Self::BadRequest(format!("{context}: {}", failure.describe()));
        }
        Self::internal(context, err)
    }

    /// Returns the store failure class behind an `Internal` error, if any.
    pub fn write_failure(&self) -> Option<WriteFailure> {
        match self {
            Self::Internal {
                source: Some(source),
                ..
            } => Some(source.write_failure()),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::AlreadyExists(message) => write!(f, "already exists: {message}"),
            Self::BadRequest(message) => write!(f, "bad request: {message}"),
            Self::Internal {
                context,
                source: Some(source),
            } => write!(f, "{context}: {source}"),
            Self::Internal {
                context,
                source: None,
            } => write!(f, "{context}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal {
                source: Some(source),
                ..
            } => Some(source),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::internal("storage failure", value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::internal("storage failure", DbError::Sqlite(value))
    }
}
