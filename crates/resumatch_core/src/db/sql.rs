//! Statement helpers shared by repositories and the search composer.

use super::{DbError, DbResult, WriteFailure};
use crate::context::CallContext;
use rusqlite::Connection;

/// VM instructions between cancel-token polls while a statement runs.
const PROGRESS_POLL_OPS: i32 = 1_000;

/// Renders `?first, ?first+1, ...` for `count` numbered placeholders.
pub(crate) fn placeholder_list(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs one store call under the caller's cancel token.
///
/// The token is checked before the call and polled by a progress handler
/// while the statement executes, so a cancelled or expired token interrupts
/// an in-flight statement.
pub(crate) fn guarded<T>(
    conn: &Connection,
    ctx: &CallContext,
    call: impl FnOnce() -> rusqlite::Result<T>,
) -> DbResult<T> {
    let token = ctx.cancel_token();
    token.check()?;

    let poll = token.clone();
    conn.progress_handler(PROGRESS_POLL_OPS, Some(move || poll.is_cancelled()));
    let _reset = ProgressReset { conn };

    call().map_err(|err| match token.reason() {
        Some(reason) if WriteFailure::is_interrupt(&err) => DbError::Cancelled(reason),
        _ => DbError::Sqlite(err),
    })
}

struct ProgressReset<'c> {
    conn: &'c Connection,
}

impl Drop for ProgressReset<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}
