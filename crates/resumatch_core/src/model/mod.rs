//! Domain model for dictionaries, join-table edges and vacancy projections.
//!
//! # Responsibility
//! - Name the dictionary and join tables the core is allowed to touch.
//! - Define the typed values vacancy search filters and returns.
//!
//! # Invariants
//! - Table and column names only ever come from these enums, never from
//!   caller input, so they are safe to splice into SQL text.

pub mod association;
pub mod lookup;
pub mod vacancy;
