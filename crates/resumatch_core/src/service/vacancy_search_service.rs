//! Vacancy search from caller-facing request values.
//!
//! # Responsibility
//! - Validate and parse string filters into typed criteria.
//! - Translate specialization names into ids without creating any.
//!
//! # Invariants
//! - Unknown enum values and negative salary floors are `BadRequest`.
//! - Specialization names that match nothing yield an empty page, never an
//!   unfiltered one.

use crate::config::SearchLimits;
use crate::context::CallContext;
use crate::model::lookup::LookupKind;
use crate::model::vacancy::{Employment, Experience, VacancySummary};
use crate::observer::{default_observer, RepoObserver};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::lookup_repo::SqliteLookupRepository;
use crate::search::criteria::SearchCriteria;
use crate::search::vacancy_search::VacancySearch;
use crate::service::reference_service::normalize_names;
use rusqlite::Connection;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// Search request as received from a transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VacancySearchRequest {
    pub query: Option<String>,
    /// Specialization names, matched exactly after whitespace normalization.
    pub specializations: Vec<String>,
    pub min_salary: Option<i64>,
    /// Employment wire names, e.g. `full_time`.
    pub employment: Vec<String>,
    /// Experience wire names, e.g. `1_3_years`.
    pub experience: Vec<String>,
    pub limit: u32,
    pub offset: u32,
}

/// Search use-case over one connection.
pub struct VacancySearchService<'conn> {
    conn: &'conn Connection,
    limits: SearchLimits,
    observer: Arc<dyn RepoObserver>,
}

impl<'conn> VacancySearchService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_options(conn, SearchLimits::default(), default_observer())
    }

    pub fn with_options(
        conn: &'conn Connection,
        limits: SearchLimits,
        observer: Arc<dyn RepoObserver>,
    ) -> Self {
        Self {
            conn,
            limits,
            observer,
        }
    }

    pub fn search(
        &self,
        ctx: &CallContext,
        request: &VacancySearchRequest,
    ) -> RepoResult<Vec<VacancySummary>> {
        if let Some(floor) = request.min_salary {
            if floor < 0 {
                return Err(RepoError::BadRequest(format!(
                    "min_salary must not be negative, got {floor}"
                )));
            }
        }
        let employment_types = parse_all::<Employment>(&request.employment)?;
        let experience_levels = parse_all::<Experience>(&request.experience)?;

        let names = normalize_names(&request.specializations);
        let category_ids = if names.is_empty() {
            None
        } else {
            let ids = SqliteLookupRepository::with_observer(self.conn, Arc::clone(&self.observer))
                .find_ids_by_names(ctx, LookupKind::Specialization, &names)?;
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            Some(ids)
        };

        let criteria = SearchCriteria {
            free_text: request.query.clone(),
            category_ids,
            min_value: request.min_salary,
            employment_types: Some(employment_types),
            experience_levels: Some(experience_levels),
            limit: request.limit,
            offset: request.offset,
        };
        VacancySearch::with_options(self.conn, self.limits, Arc::clone(&self.observer))
            .search(ctx, &criteria)
    }
}

fn parse_all<T>(values: &[String]) -> RepoResult<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    values
        .iter()
        .map(|value| T::from_str(value.trim()).map_err(|err| RepoError::BadRequest(err.to_string())))
        .collect()
}
