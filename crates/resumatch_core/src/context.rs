//! Per-call request context and cancellation.
//!
//! # Responsibility
//! - Carry a request id for log correlation through every repository call.
//! - Carry a cancel token (explicit flag plus optional deadline) that every
//!   store call checks before and while it runs.
//!
//! # Invariants
//! - A cancelled token never becomes un-cancelled.
//! - Contexts hold no store state; they are cheap to clone and share.

use crate::db::{DbError, DbResult};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Why a cancel token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// `CancelToken::cancel` was called.
    Cancelled,
    /// The token's deadline passed.
    DeadlineExceeded,
}

impl Display for CancelReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled by caller"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Shared cancellation signal with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Creates a token that only fires when cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that also fires once `deadline` has passed.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Creates a token that fires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Fires the token for every clone sharing it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Returns why the token fired, or `None` while it is still live.
    pub fn reason(&self) -> Option<CancelReason> {
        if self.flag.load(Ordering::SeqCst) {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fails with `DbError::Cancelled` once the token has fired.
    pub fn check(&self) -> DbResult<()> {
        match self.reason() {
            Some(reason) => Err(DbError::Cancelled(reason)),
            None => Ok(()),
        }
    }
}

/// Request-scoped context passed to every repository operation.
#[derive(Debug, Clone)]
pub struct CallContext {
    request_id: String,
    cancel: CancelToken,
}

impl CallContext {
    /// Creates a context with a fresh request id and a live token.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the generated request id with a caller-provided one.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{CallContext, CancelReason, CancelToken};
    use std::time::{Duration, Instant};

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert_eq!(clone.reason(), Some(CancelReason::Cancelled));
        assert!(clone.check().is_err());
    }

    #[test]
    fn past_deadline_reports_deadline_exceeded() {
        let token = CancelToken::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(token.reason(), Some(CancelReason::DeadlineExceeded));

        let live = CancelToken::with_timeout(Duration::from_secs(60));
        assert!(live.check().is_ok());
    }

    #[test]
    fn contexts_get_distinct_request_ids_unless_overridden() {
        let first = CallContext::new();
        let second = CallContext::new();
        assert_ne!(first.request_id(), second.request_id());

        let fixed = CallContext::new().with_request_id("req-7");
        assert_eq!(fixed.request_id(), "req-7");
    }
}
