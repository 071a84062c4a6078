//! Owner lifecycle service for deferred preference persistence.
//!
//! # Responsibility
//! - Commit an owner's pending preferences together with the owner itself.
//! - Reload and destroy owners' preferences.
//! - Expose direct record creation and value lookups.
//!
//! # Invariants
//! - Validation runs before any write; an invalid owner writes nothing.
//! - Owner row and pending records share one immediate transaction.
//! - In-memory records are marked persisted only after commit succeeds.

use crate::model::preference::{OwnerRef, PreferenceId, PreferenceRecord};
use crate::owner::preferrer::Preferrer;
use crate::repo::preference_repo::{
    PreferenceRepository, RepoError, RepoResult, SqlitePreferenceRepository,
};
use crate::schema::validation::{ValidationErrors, MESSAGE_INVALID};
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Owner save failure.
#[derive(Debug)]
pub enum SaveError {
    /// Owner or preference rules failed; nothing was written.
    Invalid(ValidationErrors),
    /// Storage failure; the transaction was rolled back.
    Repo(RepoError),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SaveError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SaveError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Counts of records written by one successful save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub created: usize,
    pub updated: usize,
}

/// Lifecycle service over a migrated SQLite connection.
pub struct PreferenceService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> PreferenceService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Read-only repository over the service connection.
    pub fn repository(&self) -> SqlitePreferenceRepository<'_> {
        SqlitePreferenceRepository::new(&*self.conn)
    }

    /// Collects owner, schema and record validation failures.
    pub fn validate<O: Preferrer>(&self, owner: &O) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        owner.validate_owner(&mut errors);
        if let Some(schema) = owner.preference_schema() {
            schema.validate(owner.preferences(), &mut errors);
        }
        if owner
            .preferences()
            .pending()
            .iter()
            .any(|record| record.validate().is_err())
        {
            errors.add("preferences", MESSAGE_INVALID);
        }
        errors.into_result()
    }

    /// Saves the owner and commits its pending preferences atomically.
    ///
    /// On any failure every record stays pending in memory.
    pub fn save<O: Preferrer>(&mut self, owner: &mut O) -> Result<CommitReport, SaveError> {
        let started_at = Instant::now();
        let owner_type = O::PREFERRER_TYPE;

        if let Err(errors) = self.validate(owner) {
            warn!(
                "event=preferences_commit module=service status=error owner_type={} error_code=validation_failed error_count={}",
                owner_type,
                errors.len()
            );
            return Err(SaveError::Invalid(errors));
        }

        match self.commit_pending(owner) {
            Ok(report) => {
                info!(
                    "event=preferences_commit module=service status=ok owner_type={} created={} updated={} duration_ms={}",
                    owner_type,
                    report.created,
                    report.updated,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=preferences_commit module=service status=error owner_type={} error_code=commit_failed duration_ms={} error={}",
                    owner_type,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Replaces in-memory preferences with persisted state.
    pub fn reload<O: Preferrer>(&self, owner: &mut O) -> RepoResult<()> {
        let owner_ref = owner.owner_ref().clone();
        let records = self.repository().list_for_owner(&owner_ref)?;
        info!(
            "event=preferences_reload module=service status=ok owner_type={} count={}",
            owner_ref.owner_type,
            records.len()
        );
        owner.preferences_mut().reload(records);
        Ok(())
    }

    /// Destroys the owner and cascades to all of its preferences.
    pub fn destroy<O: Preferrer>(&mut self, owner: &mut O) -> RepoResult<usize> {
        let owner_ref = owner.owner_ref().clone();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        owner.destroy_owner(&tx)?;
        let deleted = SqlitePreferenceRepository::new(&tx).destroy_all(&owner_ref)?;
        tx.commit()?;

        owner.preferences_mut().reload(vec![]);
        info!(
            "event=preferences_destroy module=service status=ok owner_type={} deleted={}",
            owner_ref.owner_type, deleted
        );
        Ok(deleted)
    }

    /// Creates one record directly, outside any owner save.
    ///
    /// A second record for the same owner and name fails with
    /// `RepoError::DuplicatePreference` carrying the stored record.
    pub fn create_preference(&self, record: &PreferenceRecord) -> RepoResult<PreferenceId> {
        self.repository().create_preference(record)
    }

    /// Finds owners of type `O` whose preference `name` equals `value`.
    pub fn find_all_by<O: Preferrer>(&self, name: &str, value: &Value) -> RepoResult<Vec<OwnerRef>> {
        self.repository()
            .find_owners_by(O::PREFERRER_TYPE, name, value)
    }

    fn commit_pending<O: Preferrer>(&mut self, owner: &mut O) -> Result<CommitReport, SaveError> {
        if owner.owner_ref().owner_type != O::PREFERRER_TYPE {
            return Err(SaveError::Repo(RepoError::InvalidData(format!(
                "preference collection tagged `{}` attached to owner type `{}`",
                owner.owner_ref().owner_type,
                O::PREFERRER_TYPE
            ))));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        owner.persist_owner(&tx)?;

        let repo = SqlitePreferenceRepository::new(&tx);
        let mut report = CommitReport::default();
        let mut written = Vec::new();
        for (index, record) in owner.preferences().pending_entries() {
            match record.id() {
                None => {
                    written.push((index, repo.create_preference(record)?));
                    report.created += 1;
                }
                Some(id) => {
                    repo.update_preference(record)?;
                    written.push((index, id));
                    report.updated += 1;
                }
            }
        }
        tx.commit()?;

        owner.preferences_mut().mark_committed(&written);
        Ok(report)
    }
}
