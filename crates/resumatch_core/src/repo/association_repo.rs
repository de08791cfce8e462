//! Owner ↔ dictionary edge persistence.
//!
//! # Responsibility
//! - Attach a set of dictionary ids to one owner in a single transaction.
//! - List and bulk-remove the edges of one owner.
//!
//! # Invariants
//! - `associate` writes all edges or none.
//! - Re-attaching an existing edge is skipped, never an error.
//! - A failed rollback is reported to the observer; the error that caused
//!   the rollback is the one returned.

use crate::context::CallContext;
use crate::db::{guarded, DbError, WriteFailure};
use crate::model::association::{AssociationKind, OwnerId};
use crate::model::lookup::{LookupEntity, LookupId};
use crate::observer::{default_observer, observed, Operation, RepoObserver};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::lookup_repo::parse_lookup_row;
use log::debug;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::sync::Arc;

/// SQLite-backed association repository.
pub struct Associator<'conn> {
    conn: &'conn mut Connection,
    observer: Arc<dyn RepoObserver>,
}

impl<'conn> Associator<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self::with_observer(conn, default_observer())
    }

    pub fn with_observer(conn: &'conn mut Connection, observer: Arc<dyn RepoObserver>) -> Self {
        Self { conn, observer }
    }

    /// Attaches every id in `lookup_ids` to `owner_id`.
    ///
    /// # Contract
    /// - An empty `lookup_ids` succeeds without opening a transaction.
    /// - Edges that already exist are skipped.
    /// - A not-null, type or check violation rolls back and returns
    ///   `BadRequest`; any other failure rolls back and returns `Internal`.
    pub fn associate(
        &mut self,
        ctx: &CallContext,
        kind: AssociationKind,
        owner_id: OwnerId,
        lookup_ids: &[LookupId],
    ) -> RepoResult<()> {
        if lookup_ids.is_empty() {
            return Ok(());
        }

        let observer = Arc::clone(&self.observer);
        let conn = &mut *self.conn;
        observed(observer.as_ref(), ctx, Operation::Associate, || {
            insert_edges(conn, observer.as_ref(), ctx, kind, owner_id, lookup_ids)
        })
    }

    /// Lists the dictionary rows attached to `owner_id`, ordered by name.
    pub fn list_for_owner(
        &self,
        ctx: &CallContext,
        kind: AssociationKind,
        owner_id: OwnerId,
    ) -> RepoResult<Vec<LookupEntity>> {
        observed(self.observer.as_ref(), ctx, Operation::ListAssociations, || {
            let sql = format!(
                "SELECT l.id, l.name
                 FROM {edges} a
                 JOIN {lookup} l ON l.id = a.{lookup_col}
                 WHERE a.{owner_col} = ?1
                 ORDER BY l.name ASC;",
                edges = kind.table(),
                lookup = kind.lookup_kind().table(),
                lookup_col = kind.lookup_column(),
                owner_col = kind.owner_column(),
            );
            let conn: &Connection = &*self.conn;
            guarded(conn, ctx, || {
                let mut stmt = conn.prepare_cached(&sql)?;
                let rows = stmt.query_map([owner_id], parse_lookup_row)?;
                let entities = rows.collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(entities)
            })
            .map_err(|err| RepoError::internal(format!("failed to list {kind} edges"), err))
        })
    }

    /// Removes every edge of `owner_id` in one table. Returns how many rows
    /// were removed.
    pub fn clear_owner(
        &mut self,
        ctx: &CallContext,
        kind: AssociationKind,
        owner_id: OwnerId,
    ) -> RepoResult<usize> {
        observed(self.observer.as_ref(), ctx, Operation::ClearAssociations, || {
            let sql = format!(
                "DELETE FROM {} WHERE {} = ?1;",
                kind.table(),
                kind.owner_column()
            );
            let conn: &Connection = &*self.conn;
            guarded(conn, ctx, || conn.execute(&sql, [owner_id]))
                .map_err(|err| RepoError::internal(format!("failed to clear {kind} edges"), err))
        })
    }
}

fn insert_edges(
    conn: &mut Connection,
    observer: &dyn RepoObserver,
    ctx: &CallContext,
    kind: AssociationKind,
    owner_id: OwnerId,
    lookup_ids: &[LookupId],
) -> RepoResult<()> {
    ctx.cancel_token()
        .check()
        .map_err(|err| RepoError::internal(format!("{kind} association not started"), err))?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| RepoError::internal(format!("failed to begin {kind} transaction"), err))?;

    let outcome = insert_each(&tx, ctx, kind, owner_id, lookup_ids);
    match outcome {
        Ok(skipped) => {
            tx.commit()
                .map_err(|err| RepoError::internal(format!("failed to commit {kind} edges"), err))?;
            debug!(
                "event=association_add module=repo status=ok table={} requested={} skipped={} request_id={}",
                kind,
                lookup_ids.len(),
                skipped,
                ctx.request_id()
            );
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                observer.on_rollback_failure(ctx, Operation::Associate, &DbError::Sqlite(rollback_err));
            }
            Err(err)
        }
    }
}

/// Inserts one edge per id. Returns how many already existed.
fn insert_each(
    tx: &Transaction<'_>,
    ctx: &CallContext,
    kind: AssociationKind,
    owner_id: OwnerId,
    lookup_ids: &[LookupId],
) -> RepoResult<usize> {
    let sql = format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, ?2);",
        kind.table(),
        kind.owner_column(),
        kind.lookup_column()
    );
    let mut stmt = tx
        .prepare(&sql)
        .map_err(|err| RepoError::internal(format!("failed to prepare {kind} insert"), err))?;

    let mut skipped = 0;
    for &lookup_id in lookup_ids {
        match guarded(tx, ctx, || stmt.execute(params![owner_id, lookup_id])) {
            Ok(_) => {}
            Err(err) if err.write_failure() == WriteFailure::UniqueViolation => skipped += 1,
            Err(err) => {
                return Err(RepoError::from_failed_write(
                    format!("failed to add {kind} edge"),
                    err,
                ))
            }
        }
    }

    ctx.cancel_token().check().map_err(|err| {
        RepoError::internal(format!("{kind} association abandoned before commit"), err)
    })?;
    Ok(skipped)
}
