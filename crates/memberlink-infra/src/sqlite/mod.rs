//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod account;
pub mod member;
pub mod pool;
pub mod session;

use chrono::{DateTime, Utc};
use memberlink_types::error::RepositoryError;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Map a sqlx error, turning UNIQUE violations into `Conflict`.
pub(crate) fn map_write_error(e: sqlx::Error, conflict: impl FnOnce(&str) -> String) -> RepositoryError {
    match e {
        sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
            RepositoryError::Conflict(conflict(db_err.message()))
        }
        other => RepositoryError::Query(other.to_string()),
    }
}
