//! Attach dictionary names to resumes and vacancies.
//!
//! # Responsibility
//! - Normalize free-form names (trim, collapse inner whitespace, drop blanks,
//!   dedupe case-insensitively keeping the first spelling).
//! - Resolve the names to ids and attach them to one owner.
//!
//! # Invariants
//! - Resolution fully succeeds before any edge is written.
//! - `replace_names` clears then attaches; the two steps are separate
//!   transactions, so a failed attach leaves the owner with no edges.

use crate::context::CallContext;
use crate::model::association::{AssociationKind, OwnerId};
use crate::model::lookup::{LookupEntity, LookupId};
use crate::observer::{default_observer, RepoObserver};
use crate::repo::association_repo::Associator;
use crate::repo::error::RepoResult;
use crate::repo::lookup_repo::SqliteLookupRepository;
use crate::repo::resolver::ReferenceResolver;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::Arc;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Name-based association use-cases over one connection.
pub struct ReferenceService<'conn> {
    conn: &'conn mut Connection,
    observer: Arc<dyn RepoObserver>,
}

impl<'conn> ReferenceService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self::with_observer(conn, default_observer())
    }

    pub fn with_observer(conn: &'conn mut Connection, observer: Arc<dyn RepoObserver>) -> Self {
        Self { conn, observer }
    }

    /// Resolves `names` (creating missing dictionary rows) and attaches them
    /// to `owner_id`.
    ///
    /// Returns the ids in normalized-name order. Input with no usable names
    /// returns an empty list and touches nothing.
    pub fn attach_names<S: AsRef<str>>(
        &mut self,
        ctx: &CallContext,
        kind: AssociationKind,
        owner_id: OwnerId,
        names: &[S],
    ) -> RepoResult<Vec<LookupId>> {
        let names = normalize_names(names);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let ids = {
            let store = SqliteLookupRepository::with_observer(&*self.conn, Arc::clone(&self.observer));
            ReferenceResolver::with_observer(store, Arc::clone(&self.observer)).resolve_all(
                ctx,
                kind.lookup_kind(),
                &names,
            )?
        };

        Associator::with_observer(&mut *self.conn, Arc::clone(&self.observer))
            .associate(ctx, kind, owner_id, &ids)?;
        Ok(ids)
    }

    /// Replaces the owner's edges in one join table with `names`.
    pub fn replace_names<S: AsRef<str>>(
        &mut self,
        ctx: &CallContext,
        kind: AssociationKind,
        owner_id: OwnerId,
        names: &[S],
    ) -> RepoResult<Vec<LookupId>> {
        Associator::with_observer(&mut *self.conn, Arc::clone(&self.observer))
            .clear_owner(ctx, kind, owner_id)?;
        self.attach_names(ctx, kind, owner_id, names)
    }

    /// Lists the dictionary rows attached to `owner_id`, ordered by name.
    pub fn attached(
        &mut self,
        ctx: &CallContext,
        kind: AssociationKind,
        owner_id: OwnerId,
    ) -> RepoResult<Vec<LookupEntity>> {
        Associator::with_observer(&mut *self.conn, Arc::clone(&self.observer))
            .list_for_owner(ctx, kind, owner_id)
    }
}

/// Normalizes one name. Returns `None` for blank input.
pub fn normalize_name(name: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(name.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Normalizes and deduplicates names, keeping first-occurrence order and
/// the first spelling of names that differ only in case.
pub fn normalize_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter_map(|name| normalize_name(name.as_ref()))
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, normalize_names};

    #[test]
    fn normalize_name_trims_and_collapses_whitespace() {
        assert_eq!(
            normalize_name("  Machine \t  Learning\n"),
            Some("Machine Learning".to_string())
        );
        assert_eq!(normalize_name(" \t "), None);
    }

    #[test]
    fn normalize_names_dedupes_case_insensitively_keeping_first() {
        let names = normalize_names(&["Go", " go ", "", "SQL", "GO", "sql  "]);
        assert_eq!(names, vec!["Go".to_string(), "SQL".to_string()]);
    }
}
