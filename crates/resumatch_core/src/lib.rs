//! Core storage logic for the ResuMatch job board.
//! Dictionary resolution, resume/vacancy associations and vacancy search.

pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod observer;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{CoreConfig, DatabaseConfig, SearchLimits};
pub use context::{CallContext, CancelReason, CancelToken};
pub use db::{open_db, open_db_in_memory, open_db_with_config, DbError, DbResult, WriteFailure};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::association::{AssociationEdge, AssociationKind, OwnerId};
pub use model::lookup::{LookupEntity, LookupId, LookupKind};
pub use model::vacancy::{Employment, Experience, UnknownValueError, VacancyId, VacancySummary};
pub use observer::{LogObserver, NoopObserver, Operation, RepoObserver};
pub use repo::association_repo::Associator;
pub use repo::error::{ErrorKind, RepoError, RepoResult};
pub use repo::lookup_repo::{LookupStore, SqliteLookupRepository};
pub use repo::resolver::ReferenceResolver;
pub use search::composer::{compose, ComposedQuery};
pub use search::criteria::SearchCriteria;
pub use search::vacancy_search::VacancySearch;
pub use service::reference_service::ReferenceService;
pub use service::vacancy_search_service::{VacancySearchRequest, VacancySearchService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
