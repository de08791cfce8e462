//! Extension points for diagnostics around repository operations.
//!
//! # Responsibility
//! - Let callers hook logging or metrics into resolution, association and
//!   search without global state inside the repositories.
//! - Provide `LogObserver`, the default hook, which writes metadata-only
//!   `log` events.
//!
//! # Invariants
//! - Observers are notified; they never change the outcome of a call.

use crate::context::CallContext;
use crate::db::DbError;
use crate::logging::sanitize_message;
use crate::model::lookup::LookupKind;
use crate::repo::error::{ErrorKind, RepoError};
use log::{debug, error, info, warn};
use std::sync::Arc;

const MAX_LOGGED_ERROR_CHARS: usize = 240;

/// Repository operation an observer event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Resolve,
    ResolveAll,
    Associate,
    ListAssociations,
    ClearAssociations,
    LookupRead,
    Search,
}

impl Operation {
    /// Stable event name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "lookup_resolve",
            Self::ResolveAll => "lookup_resolve_all",
            Self::Associate => "association_add",
            Self::ListAssociations => "association_list",
            Self::ClearAssociations => "association_clear",
            Self::LookupRead => "lookup_read",
            Self::Search => "vacancy_search",
        }
    }
}

/// Hooks invoked at fixed points of every repository operation.
///
/// All methods default to no-ops so implementors pick what they need.
pub trait RepoObserver: Send + Sync {
    /// Before the operation touches the store.
    fn on_call(&self, _ctx: &CallContext, _operation: Operation) {}

    /// A dictionary insert lost a uniqueness race and is being re-read.
    fn on_conflict_retry(&self, _ctx: &CallContext, _kind: LookupKind) {}

    /// The operation is about to return this error.
    fn on_error(&self, _ctx: &CallContext, _operation: Operation, _err: &RepoError) {}

    /// Rolling back after an earlier error failed too. The earlier error is
    /// still the one returned.
    fn on_rollback_failure(&self, _ctx: &CallContext, _operation: Operation, _err: &DbError) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RepoObserver for NoopObserver {}

/// Observer that writes `event=... module=repo status=...` log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RepoObserver for LogObserver {
    fn on_call(&self, ctx: &CallContext, operation: Operation) {
        debug!(
            "event={} module=repo status=start request_id={}",
            operation.as_str(),
            ctx.request_id()
        );
    }

    fn on_conflict_retry(&self, ctx: &CallContext, kind: LookupKind) {
        info!(
            "event=lookup_resolve module=repo status=conflict_retry kind={} request_id={}",
            kind,
            ctx.request_id()
        );
    }

    fn on_error(&self, ctx: &CallContext, operation: Operation, err: &RepoError) {
        let message = sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS);
        match err.kind() {
            ErrorKind::Internal => error!(
                "event={} module=repo status=error error_kind={} request_id={} error={}",
                operation.as_str(),
                err.kind().as_str(),
                ctx.request_id(),
                message
            ),
            kind => warn!(
                "event={} module=repo status=error error_kind={} request_id={} error={}",
                operation.as_str(),
                kind.as_str(),
                ctx.request_id(),
                message
            ),
        }
    }

    fn on_rollback_failure(&self, ctx: &CallContext, operation: Operation, err: &DbError) {
        error!(
            "event={} module=repo status=rollback_failed request_id={} error={}",
            operation.as_str(),
            ctx.request_id(),
            sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
        );
    }
}

/// Default observer for repositories constructed without one.
pub fn default_observer() -> Arc<dyn RepoObserver> {
    Arc::new(LogObserver)
}

/// Wraps one operation with `on_call` and, on failure, `on_error`.
pub(crate) fn observed<T>(
    observer: &dyn RepoObserver,
    ctx: &CallContext,
    operation: Operation,
    call: impl FnOnce() -> Result<T, RepoError>,
) -> Result<T, RepoError> {
    observer.on_call(ctx, operation);
    let result = call();
    if let Err(err) = &result {
        observer.on_error(ctx, operation, err);
    }
    result
}
