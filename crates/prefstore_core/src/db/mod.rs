//! SQLite storage bootstrap for the preference store.
//!
//! # Responsibility
//! - Open and configure SQLite connections for prefstore core.
//! - Apply the `preferences` schema before any record access.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must only be built on connections returned from this module.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure opening, migrating or querying the preference store.
///
/// Repository errors wrap this; uniqueness conflicts on `preferences` are
/// surfaced by the repository as `RepoError::DuplicatePreference` instead.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement: file access, a busy store past the busy
    /// timeout, a failed migration script or a violated `preferences`
    /// constraint (name length, uniqueness) that reached SQL.
    Sqlite(rusqlite::Error),
    /// The store was migrated by a newer build; its `preferences` layout may
    /// not match what this build reads and writes.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "preference store error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "preference store schema version {db_version} is newer than this build supports ({latest_supported}); refusing to open"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
