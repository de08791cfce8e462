//! Vacancy search: filter criteria, SQL composition and execution.
//!
//! # Responsibility
//! - Turn optional filter criteria into one parameterized statement.
//! - Execute it and map rows into `VacancySummary` values.

pub mod composer;
pub mod criteria;
pub mod vacancy_search;
