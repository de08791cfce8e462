//! Executes composed vacancy search statements.
//!
//! # Invariants
//! - One statement per call.
//! - A row that fails to map fails the whole call; partial pages are never
//!   returned.
//! - Zero matches is an empty list, not an error.

use crate::config::SearchLimits;
use crate::context::CallContext;
use crate::db::guarded;
use crate::model::vacancy::{Employment, Experience, VacancySummary};
use crate::observer::{default_observer, observed, Operation, RepoObserver};
use crate::repo::error::{RepoError, RepoResult};
use crate::search::composer::compose;
use crate::search::criteria::SearchCriteria;
use log::debug;
use rusqlite::types::Type;
use rusqlite::{params_from_iter, Connection, Row};
use std::str::FromStr;
use std::sync::Arc;

/// Vacancy search over one connection.
pub struct VacancySearch<'conn> {
    conn: &'conn Connection,
    limits: SearchLimits,
    observer: Arc<dyn RepoObserver>,
}

impl<'conn> VacancySearch<'conn> {
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

    /// Returns one page of vacancies matching `criteria`, newest first.
    ///
    /// `criteria.limit` of zero means the configured default; larger values
    /// are capped at the configured maximum.
    pub fn search(
        &self,
        ctx: &CallContext,
        criteria: &SearchCriteria,
    ) -> RepoResult<Vec<VacancySummary>> {
        observed(self.observer.as_ref(), ctx, Operation::Search, || {
            let window = SearchCriteria {
                limit: self.limits.normalize(criteria.limit),
                ..criteria.clone()
            };
            let query = compose(&window);

            let summaries = guarded(self.conn, ctx, || {
                let mut stmt = self.conn.prepare_cached(&query.sql)?;
                let rows = stmt.query_map(params_from_iter(query.args.iter()), parse_summary_row)?;
                let summaries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(summaries)
            })
            .map_err(|err| RepoError::internal("failed to search vacancies", err))?;

            debug!(
                "event=vacancy_search module=search status=ok args={} rows={} request_id={}",
                query.args.len(),
                summaries.len(),
                ctx.request_id()
            );
            Ok(summaries)
        })
    }
}

fn parse_summary_row(row: &Row<'_>) -> rusqlite::Result<VacancySummary> {
    Ok(VacancySummary {
        id: row.get("id")?,
        title: row.get("title")?,
        employer_id: row.get("employer_id")?,
        company_name: row.get("company_name")?,
        specialization: row.get("specialization")?,
        employment: parse_text_column::<Employment>(row, "employment")?,
        experience: parse_text_column::<Experience>(row, "experience")?,
        salary_from: row.get("salary_from")?,
        salary_to: row.get("salary_to")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_text_column<T>(row: &Row<'_>, column: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let index = row.as_ref().column_index(column)?;
    let text: String = row.get(index)?;
    T::from_str(&text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}
