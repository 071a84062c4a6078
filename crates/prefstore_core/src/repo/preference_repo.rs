//! Preference repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the record-store contract the preference core commits through.
//! - Keep SQL and value serialization inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `PreferenceRecord::validate()` before SQL mutations.
//! - `(preferrer_type, preferrer_id, name)` uniqueness is checked on create
//!   only; the UNIQUE index is the final backstop.
//! - Values are stored as JSON text; SQL NULL means no value.

use crate::db::DbError;
use crate::model::preference::{
    is_blank, OwnerRef, PreferenceId, PreferenceRecord, PreferenceValidationError,
};
use log::warn;
use rusqlite::{params, Connection, ErrorCode, Row};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PREFERENCE_SELECT_SQL: &str = "SELECT
    id,
    preferrer_type,
    preferrer_id,
    name,
    value
FROM preferences";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for preference persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PreferenceValidationError),
    Db(DbError),
    NotFound(PreferenceId),
    /// Create rejected by the uniqueness rule; carries the stored record.
    DuplicatePreference(Box<PreferenceRecord>),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "preference not found: {id}"),
            Self::DuplicatePreference(existing) => write!(
                f,
                "preference `{}` already exists for {}",
                existing.name(),
                existing.owner()
            ),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted preference data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::DuplicatePreference(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<PreferenceValidationError> for RepoError {
    fn from(value: PreferenceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store contract for preference rows.
pub trait PreferenceRepository {
    /// Inserts a new record, rejecting a second `(owner, name)` pair.
    fn create_preference(&self, record: &PreferenceRecord) -> RepoResult<PreferenceId>;
    /// Rewrites the value of a persisted record.
    fn update_preference(&self, record: &PreferenceRecord) -> RepoResult<()>;
    fn get_preference(&self, owner: &OwnerRef, name: &str) -> RepoResult<Option<PreferenceRecord>>;
    /// Lists an owner's records in insertion order.
    fn list_for_owner(&self, owner: &OwnerRef) -> RepoResult<Vec<PreferenceRecord>>;
    /// Deletes every record of an owner and returns the deleted count.
    fn destroy_all(&self, owner: &OwnerRef) -> RepoResult<usize>;
    /// Finds owners of one type whose record `name` equals `value` exactly.
    fn find_owners_by(
        &self,
        owner_type: &str,
        name: &str,
        value: &Value,
    ) -> RepoResult<Vec<OwnerRef>>;
    fn count_preferences(&self) -> RepoResult<u64>;
}

/// SQLite-backed preference repository.
///
/// Accepts a plain connection or a transaction (via deref).
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn create_preference(&self, record: &PreferenceRecord) -> RepoResult<PreferenceId> {
        record.validate()?;

        if let Some(existing) = self.get_preference(record.owner(), record.name())? {
            warn!(
                "event=preference_duplicate module=repo status=error owner_type={} name_len={}",
                record.owner().owner_type,
                record.name().chars().count()
            );
            return Err(RepoError::DuplicatePreference(Box::new(existing)));
        }

        let value_text = value_to_db(record.value())?;
        let inserted = self.conn.execute(
            "INSERT INTO preferences (
                preferrer_type,
                preferrer_id,
                name,
                value
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                record.owner().owner_type.as_str(),
                record.owner().owner_id.as_str(),
                record.name(),
                value_text.as_deref(),
            ],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => {
                match self.get_preference(record.owner(), record.name())? {
                    Some(existing) => Err(RepoError::DuplicatePreference(Box::new(existing))),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update_preference(&self, record: &PreferenceRecord) -> RepoResult<()> {
        record.validate()?;
        let Some(id) = record.id() else {
            return Err(RepoError::InvalidData(format!(
                "preference `{}` has not been created yet",
                record.name()
            )));
        };

        let value_text = value_to_db(record.value())?;
        let changed = self.conn.execute(
            "UPDATE preferences
             SET
                value = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![value_text.as_deref(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_preference(&self, owner: &OwnerRef, name: &str) -> RepoResult<Option<PreferenceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PREFERENCE_SELECT_SQL}
             WHERE preferrer_type = ?1
               AND preferrer_id = ?2
               AND name = ?3;"
        ))?;

        let mut rows = stmt.query(params![
            owner.owner_type.as_str(),
            owner.owner_id.as_str(),
            name
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_preference_row(row)?));
        }

        Ok(None)
    }

    fn list_for_owner(&self, owner: &OwnerRef) -> RepoResult<Vec<PreferenceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PREFERENCE_SELECT_SQL}
             WHERE preferrer_type = ?1
               AND preferrer_id = ?2
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query(params![owner.owner_type.as_str(), owner.owner_id.as_str()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_preference_row(row)?);
        }

        Ok(records)
    }

    fn destroy_all(&self, owner: &OwnerRef) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM preferences
             WHERE preferrer_type = ?1
               AND preferrer_id = ?2;",
            params![owner.owner_type.as_str(), owner.owner_id.as_str()],
        )?;
        Ok(deleted)
    }

    fn find_owners_by(
        &self,
        owner_type: &str,
        name: &str,
        value: &Value,
    ) -> RepoResult<Vec<OwnerRef>> {
        let Some(value_text) = value_to_db(Some(value))? else {
            return Ok(vec![]);
        };

        let mut stmt = self.conn.prepare(
            "SELECT preferrer_id
             FROM preferences
             WHERE preferrer_type = ?1
               AND name = ?2
               AND value = ?3
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query(params![owner_type, name, value_text.as_str()])?;
        let mut owners = Vec::new();
        while let Some(row) = rows.next()? {
            let owner_id: String = row.get(0)?;
            owners.push(OwnerRef::new(owner_type, owner_id));
        }

        Ok(owners)
    }

    fn count_preferences(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM preferences;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative preference count `{count}`")))
    }
}

fn parse_preference_row(row: &Row<'_>) -> RepoResult<PreferenceRecord> {
    let id: PreferenceId = row.get("id")?;
    let owner = OwnerRef::new(
        row.get::<_, String>("preferrer_type")?,
        row.get::<_, String>("preferrer_id")?,
    );
    let name: String = row.get("name")?;
    let value = match row.get::<_, Option<String>>("value")? {
        Some(text) => Some(serde_json::from_str::<Value>(&text).map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid json in preferences.value for id {id}: {err}"
            ))
        })?),
        None => None,
    };

    let record = PreferenceRecord::persisted(id, owner, name, value);
    record.validate()?;
    Ok(record)
}

fn value_to_db(value: Option<&Value>) -> RepoResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(value) if is_blank(value) => Ok(None),
        Some(value) => serde_json::to_string(value).map(Some).map_err(|err| {
            RepoError::InvalidData(format!("preference value is not serializable: {err}"))
        }),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
            && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
