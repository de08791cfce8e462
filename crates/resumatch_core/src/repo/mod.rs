//! Repository layer: dictionary resolution and association persistence.
//!
//! # Responsibility
//! - Resolve dictionary names to ids (find-or-create) and attach them to
//!   owners.
//! - Isolate SQLite statements and constraint classification from services.
//!
//! # Invariants
//! - Every repository call takes a `CallContext` and honors its cancel token.
//! - Repository APIs return `RepoError`, never raw store errors.

pub mod association_repo;
pub mod error;
pub mod lookup_repo;
pub mod resolver;
