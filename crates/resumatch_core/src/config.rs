//! Core configuration shape.
//!
//! # Responsibility
//! - Describe logging, database bootstrap and search pagination settings.
//! - Provide defaults so callers only override what they need.
//!
//! # Invariants
//! - `SearchLimits::max_limit` is never below `default_limit` after
//!   normalization.

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SEARCH_LIMIT: u32 = 20;
const MAX_SEARCH_LIMIT: u32 = 100;

/// Top-level configuration for embedding the core in a service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<String>,
    pub database: DatabaseConfig,
    pub search: SearchLimits,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            database: DatabaseConfig::default(),
            search: SearchLimits::default(),
        }
    }
}

/// Connection bootstrap options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Switch file databases to WAL so readers do not block the writer.
    pub wal: bool,
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            wal: true,
        }
    }
}

/// Pagination bounds applied to search requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Used when a request asks for `limit = 0`.
    pub default_limit: u32,
    /// Requests above this are clamped.
    pub max_limit: u32,
}

impl SearchLimits {
    /// Applies default and cap to a requested page size.
    pub fn normalize(&self, requested: u32) -> u32 {
        let max = self.max_limit.max(1);
        let default = self.default_limit.clamp(1, max);
        match requested {
            0 => default,
            value if value > max => max,
            value => value,
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
            max_limit: MAX_SEARCH_LIMIT,
        }
    }
}
