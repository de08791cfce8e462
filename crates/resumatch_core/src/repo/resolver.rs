//! Find-or-create resolution of dictionary names to stable ids.
//!
//! # Responsibility
//! - Map one name to one id, creating the dictionary row on first use.
//! - Map an ordered list of names to an ordered list of ids.
//!
//! # Invariants
//! - No in-process locking: concurrent resolvers converge because the store
//!   rejects the second insert of a name with a uniqueness violation.
//! - A uniqueness conflict is retried with exactly one re-read; a failed or
//!   empty re-read is `Internal`.
//! - Batch resolution returns every id or an error, never a prefix.

use crate::context::CallContext;
use crate::db::WriteFailure;
use crate::model::lookup::{LookupId, LookupKind};
use crate::observer::{default_observer, observed, Operation, RepoObserver};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::lookup_repo::LookupStore;
use std::sync::Arc;

/// Name → id resolver over any [`LookupStore`].
pub struct ReferenceResolver<S: LookupStore> {
    store: S,
    observer: Arc<dyn RepoObserver>,
}

impl<S: LookupStore> ReferenceResolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_observer(store, default_observer())
    }

    pub fn with_observer(store: S, observer: Arc<dyn RepoObserver>) -> Self {
        Self { store, observer }
    }

    /// Resolves `name` to its dictionary id, creating the row if absent.
    ///
    /// # Errors
    /// - `BadRequest` when the store rejects the name itself (blank, wrong
    ///   type, missing).
    /// - `Internal` for any other store failure, including a failed re-read
    ///   after losing a creation race.
    pub fn resolve(&self, ctx: &CallContext, kind: LookupKind, name: &str) -> RepoResult<LookupId> {
        observed(self.observer.as_ref(), ctx, Operation::Resolve, || {
            self.check_insert_recheck(ctx, kind, name)
        })
    }

    /// Resolves every name in order. Duplicate names yield the same id.
    ///
    /// An empty input returns an empty list without touching the store. The
    /// first failure aborts the whole call.
    pub fn resolve_all<N: AsRef<str>>(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        names: &[N],
    ) -> RepoResult<Vec<LookupId>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        self.observer.on_call(ctx, Operation::ResolveAll);
        names
            .iter()
            .map(|name| self.resolve(ctx, kind, name.as_ref()))
            .collect()
    }

    fn check_insert_recheck(
        &self,
        ctx: &CallContext,
        kind: LookupKind,
        name: &str,
    ) -> RepoResult<LookupId> {
        let existing = self
            .store
            .find_id_by_name(ctx, kind, name)
            .map_err(|err| RepoError::internal(format!("failed to look up {kind} by name"), err))?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let insert_err = match self.store.insert_name(ctx, kind, name) {
            Ok(id) => return Ok(id),
            Err(err) => err,
        };

        if insert_err.write_failure() != WriteFailure::UniqueViolation {
            return Err(RepoError::from_failed_write(
                format!("failed to create {kind}"),
                insert_err,
            ));
        }

        // Another writer created the row between our read and insert.
        self.observer.on_conflict_retry(ctx, kind);
        match self.store.find_id_by_name(ctx, kind, name) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(RepoError::internal_message(format!(
                "{kind} missing on re-read after uniqueness conflict"
            ))),
            Err(err) => Err(RepoError::internal(
                format!("failed to re-read {kind} after uniqueness conflict"),
                err,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReferenceResolver;
    use crate::context::CallContext;
    use crate::db::{DbError, DbResult};
    use crate::model::lookup::{LookupId, LookupKind};
    use crate::observer::{Operation, RepoObserver};
    use crate::repo::error::{ErrorKind, RepoError};
    use crate::repo::lookup_repo::LookupStore;
    use rusqlite::ffi;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    enum Step {
        Find(DbResult<Option<LookupId>>),
        Insert(DbResult<LookupId>),
    }

    /// Store that replays a fixed script and records what was called.
    struct ScriptedStore {
        steps: RefCell<VecDeque<Step>>,
        calls: RefCell<Vec<&'static str>>,
    }

    impl ScriptedStore {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: RefCell::new(steps.into()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn assert_exhausted(&self) {
            assert!(self.steps.borrow().is_empty(), "script not fully consumed");
        }
    }

    impl LookupStore for ScriptedStore {
        fn find_id_by_name(
            &self,
            _ctx: &CallContext,
            _kind: LookupKind,
            _name: &str,
        ) -> DbResult<Option<LookupId>> {
            self.calls.borrow_mut().push("find");
            match self.steps.borrow_mut().pop_front() {
                Some(Step::Find(result)) => result,
                _ => panic!("unexpected find"),
            }
        }

        fn insert_name(
            &self,
            _ctx: &CallContext,
            _kind: LookupKind,
            _name: &str,
        ) -> DbResult<LookupId> {
            self.calls.borrow_mut().push("insert");
            match self.steps.borrow_mut().pop_front() {
                Some(Step::Insert(result)) => result,
                _ => panic!("unexpected insert"),
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RepoObserver for RecordingObserver {
        fn on_conflict_retry(&self, _ctx: &CallContext, kind: LookupKind) {
            self.events.lock().unwrap().push(format!("retry:{kind}"));
        }

        fn on_error(&self, _ctx: &CallContext, operation: Operation, err: &RepoError) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error:{}:{}", operation.as_str(), err.kind().as_str()));
        }
    }

    fn sqlite_failure(extended_code: i32) -> DbError {
        DbError::Sqlite(rusqlite::Error::SqliteFailure(
            ffi::Error::new(extended_code),
            None,
        ))
    }

    fn unique_violation() -> DbError {
        sqlite_failure(2067)
    }

    #[test]
    fn existing_name_returns_without_insert() {
        let store = ScriptedStore::new(vec![Step::Find(Ok(Some(1)))]);
        let resolver = ReferenceResolver::new(&store);

        let id = resolver
            .resolve(&CallContext::new(), LookupKind::Skill, "Go")
            .unwrap();

        assert_eq!(id, 1);
        assert_eq!(*store.calls.borrow(), vec!["find"]);
        store.assert_exhausted();
    }

    #[test]
    fn missing_name_is_created() {
        let store = ScriptedStore::new(vec![Step::Find(Ok(None)), Step::Insert(Ok(2))]);
        let resolver = ReferenceResolver::new(&store);

        let id = resolver
            .resolve(&CallContext::new(), LookupKind::Skill, "Python")
            .unwrap();

        assert_eq!(id, 2);
        store.assert_exhausted();
    }

    #[test]
    fn lost_race_rereads_winner_id() {
        let store = ScriptedStore::new(vec![
            Step::Find(Ok(None)),
            Step::Insert(Err(unique_violation())),
            Step::Find(Ok(Some(3))),
        ]);
        let observer = Arc::new(RecordingObserver::default());
        let resolver = ReferenceResolver::with_observer(&store, observer.clone());

        let id = resolver
            .resolve(&CallContext::new(), LookupKind::Skill, "Kubernetes")
            .unwrap();

        assert_eq!(id, 3);
        assert_eq!(*store.calls.borrow(), vec!["find", "insert", "find"]);
        assert_eq!(*observer.events.lock().unwrap(), vec!["retry:skill"]);
        store.assert_exhausted();
    }

    #[test]
    fn failed_reread_after_conflict_is_internal_and_not_retried() {
        let store = ScriptedStore::new(vec![
            Step::Find(Ok(None)),
            Step::Insert(Err(unique_violation())),
            Step::Find(Err(sqlite_failure(5))),
        ]);
        let resolver = ReferenceResolver::new(&store);

        let err = resolver
            .resolve(&CallContext::new(), LookupKind::Skill, "Rust")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        store.assert_exhausted();
    }

    #[test]
    fn empty_reread_after_conflict_is_internal() {
        let store = ScriptedStore::new(vec![
            Step::Find(Ok(None)),
            Step::Insert(Err(unique_violation())),
            Step::Find(Ok(None)),
        ]);
        let resolver = ReferenceResolver::new(&store);

        let err = resolver
            .resolve(&CallContext::new(), LookupKind::City, "Moscow")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        store.assert_exhausted();
    }

    #[test]
    fn input_constraint_failure_on_insert_is_bad_request() {
        for code in [1299, 3091, 275] {
            let store = ScriptedStore::new(vec![
                Step::Find(Ok(None)),
                Step::Insert(Err(sqlite_failure(code))),
            ]);
            let observer = Arc::new(RecordingObserver::default());
            let resolver = ReferenceResolver::with_observer(&store, observer.clone());

            let err = resolver
                .resolve(&CallContext::new(), LookupKind::Skill, " ")
                .unwrap_err();

            assert_eq!(err.kind(), ErrorKind::BadRequest, "code {code}");
            assert_eq!(
                *observer.events.lock().unwrap(),
                vec!["error:lookup_resolve:bad_request"]
            );
        }
    }

    #[test]
    fn other_insert_failure_is_internal() {
        let store = ScriptedStore::new(vec![
            Step::Find(Ok(None)),
            Step::Insert(Err(sqlite_failure(1))),
        ]);
        let resolver = ReferenceResolver::new(&store);

        let err = resolver
            .resolve(&CallContext::new(), LookupKind::Skill, "Docker")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn initial_lookup_failure_is_internal_without_insert() {
        let store = ScriptedStore::new(vec![Step::Find(Err(sqlite_failure(1)))]);
        let resolver = ReferenceResolver::new(&store);

        let err = resolver
            .resolve(&CallContext::new(), LookupKind::Skill, "SQL")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(*store.calls.borrow(), vec!["find"]);
    }

    #[test]
    fn resolve_all_of_nothing_touches_no_store() {
        let store = ScriptedStore::new(Vec::new());
        let resolver = ReferenceResolver::new(&store);

        let ids = resolver
            .resolve_all::<&str>(&CallContext::new(), LookupKind::Skill, &[])
            .unwrap();

        assert!(ids.is_empty());
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn resolve_all_stops_at_first_failure() {
        let store = ScriptedStore::new(vec![
            Step::Find(Ok(Some(1))),
            Step::Find(Ok(None)),
            Step::Insert(Err(sqlite_failure(275))),
        ]);
        let resolver = ReferenceResolver::new(&store);

        let err = resolver
            .resolve_all(&CallContext::new(), LookupKind::Skill, &["Go", "", "SQL"])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(*store.calls.borrow(), vec!["find", "find", "insert"]);
        store.assert_exhausted();
    }
}
