//! Dictionary (skill/specialization/city) storage contract and SQLite
//! implementation.
//!
//! # Responsibility
//! - Provide the point-read and insert primitives the reference resolver
//!   builds find-or-create on.
//! - Provide read-only dictionary queries used by adjacent use-cases.
//!
//! # Invariants
//! - `name` uniqueness is enforced by the table, not by this code.
//! - Point lookups by id report `NotFound`; set queries return empty lists.

use crate::context::CallContext;
use crate::db::{guarded, placeholder_list, DbResult};
use crate::model::lookup::{LookupEntity, LookupId, LookupKind};
use crate::observer::{default_observer, observed, Operation, RepoObserver};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Store primitives for name-keyed dictionaries.
///
/// Errors are returned unclassified so callers can branch on the constraint
/// class of a failed insert.
pub trait LookupStore {
    /// Returns the id for `name`, or `None` when no row has that name.
    fn find_id_by_name(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        name: &str,
    ) -> DbResult<Option<LookupId>>;

    /// Inserts a row for `name` and returns the store-assigned id.
    fn insert_name(&self, ctx: &CallContext, kind: LookupKind, name: &str) -> DbResult<LookupId>;
}

impl<T: LookupStore + ?Sized> LookupStore for &T {
    fn find_id_by_name(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        name: &str,
    ) -> DbResult<Option<LookupId>> {
        (**self).find_id_by_name(ctx, kind, name)
    }

    fn insert_name(&self, ctx: &CallContext, kind: LookupKind, name: &str) -> DbResult<LookupId> {
        (**self).insert_name(ctx, kind, name)
    }
}

/// SQLite-backed dictionary repository.
pub struct SqliteLookupRepository<'conn> {
    conn: &'conn Connection,
    observer: Arc<dyn RepoObserver>,
}

impl<'conn> SqliteLookupRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_observer(conn, default_observer())
    }

    pub fn with_observer(conn: &'conn Connection, observer: Arc<dyn RepoObserver>) -> Self {
        Self { conn, observer }
    }

    /// Gets one dictionary row by id.
    pub fn get_by_id(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        id: LookupId,
    ) -> RepoResult<LookupEntity> {
        observed(self.observer.as_ref(), ctx, Operation::LookupRead, || {
            let sql = format!("SELECT id, name FROM {} WHERE id = ?1;", kind.table());
            let found = guarded(self.conn, ctx, || {
                self.conn
                    .prepare_cached(&sql)?
                    .query_row([id], parse_lookup_row)
                    .optional()
            })
            .map_err(|err| RepoError::internal(format!("failed to get {kind} by id"), err))?;

            found.ok_or_else(|| RepoError::NotFound(format!("{kind} with id={id}")))
        })
    }

    /// Gets the rows for `ids`, ordered by id. Unknown ids are skipped.
    pub fn get_by_ids(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        ids: &[LookupId],
    ) -> RepoResult<Vec<LookupEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        observed(self.observer.as_ref(), ctx, Operation::LookupRead, || {
            let sql = format!(
                "SELECT id, name FROM {} WHERE id IN ({}) ORDER BY id ASC;",
                kind.table(),
                placeholder_list(1, ids.len())
            );
            self.collect_rows(ctx, &sql, ids)
                .map_err(|err| RepoError::internal(format!("failed to get {kind} rows by ids"), err))
        })
    }

    /// Lists every row of one dictionary ordered by name.
    pub fn list_all(&self, ctx: &CallContext, kind: LookupKind) -> RepoResult<Vec<LookupEntity>> {
        observed(self.observer.as_ref(), ctx, Operation::LookupRead, || {
            let sql = format!("SELECT id, name FROM {} ORDER BY name ASC;", kind.table());
            self.collect_rows(ctx, &sql, &[])
                .map_err(|err| RepoError::internal(format!("failed to list {kind} rows"), err))
        })
    }

    /// Resolves names to ids without creating anything.
    ///
    /// Unknown names are skipped; the result follows first-occurrence order
    /// of the input and holds each id once. All names go to the store in a
    /// single `IN` query.
    pub fn find_ids_by_names<S: AsRef<str>>(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        names: &[S],
    ) -> RepoResult<Vec<LookupId>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let unique: Vec<&str> = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| seen.insert(*name))
            .collect();

        observed(self.observer.as_ref(), ctx, Operation::LookupRead, || {
            let sql = ids_by_names_sql(kind, unique.len());
            let found = guarded(self.conn, ctx, || {
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(unique.iter()), |row| {
                    Ok((row.get::<_, String>(1)?, row.get::<_, LookupId>(0)?))
                })?;
                let by_name = rows.collect::<rusqlite::Result<HashMap<_, _>>>()?;
                Ok(by_name)
            })
            .map_err(|err| RepoError::internal(format!("failed to look up {kind} by names"), err))?;

            Ok(unique
                .iter()
                .filter_map(|name| found.get(*name).copied())
                .collect())
        })
    }

    fn collect_rows(
        &self,
        ctx: &CallContext,
        sql: &str,
        ids: &[LookupId],
    ) -> DbResult<Vec<LookupEntity>> {
        guarded(self.conn, ctx, || {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params_from_iter(ids.iter()), parse_lookup_row)?;
            let entities = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entities)
        })
    }
}

impl LookupStore for SqliteLookupRepository<'_> {
    fn find_id_by_name(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        name: &str,
    ) -> DbResult<Option<LookupId>> {
        let sql = format!("SELECT id FROM {} WHERE name = ?1;", kind.table());
        guarded(self.conn, ctx, || {
            self.conn
                .prepare_cached(&sql)?
                .query_row([name], |row| row.get(0))
                .optional()
        })
    }

    fn insert_name(&self, ctx: &CallContext, kind: LookupKind, name: &str) -> DbResult<LookupId> {
        let sql = format!(
            "INSERT INTO {} (name) VALUES (?1) RETURNING id;",
            kind.table()
        );
        guarded(self.conn, ctx, || {
            self.conn
                .prepare_cached(&sql)?
                .query_row([name], |row| row.get(0))
        })
    }
}

fn ids_by_names_sql(kind: LookupKind, count: usize) -> String {
    format!(
        "SELECT id, name FROM {} WHERE name IN ({});",
        kind.table(),
        placeholder_list(1, count)
    )
}

pub(crate) fn parse_lookup_row(row: &Row<'_>) -> rusqlite::Result<LookupEntity> {
    Ok(LookupEntity {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}
