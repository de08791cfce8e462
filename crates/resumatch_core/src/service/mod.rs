//! Use-case services composed from repository calls.
//!
//! # Responsibility
//! - Normalize caller input before it reaches repositories.
//! - Chain resolution, association and search into single entry points.
//!
//! # Invariants
//! - Services never issue SQL themselves.

pub mod reference_service;
pub mod vacancy_search_service;
