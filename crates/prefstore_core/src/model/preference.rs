//! Preference record domain model.
//!
//! # Responsibility
//! - Define the stored unit: one named value scoped to one owner.
//! - Track persistence state (new / changed) for deferred commits.
//!
//! # Invariants
//! - `name` is immutable after construction.
//! - `value` never holds a blank value; blanks are normalized to `None`.
//! - `is_changed()` turns true when a persisted record is assigned a
//!   different value and stays true until the next commit.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum preference name length, in characters.
pub const PREFERENCE_NAME_MAX_CHARS: usize = 128;

/// Database row id of a persisted preference record.
pub type PreferenceId = i64;

/// Polymorphic back-reference to the entity owning a preference.
///
/// This is a reference, not an ownership relation: the owner type tag and id
/// are copied into every record so records of unrelated owner types can share
/// one store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub owner_type: String,
    pub owner_id: String,
}

impl OwnerRef {
    pub fn new(owner_type: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            owner_type: owner_type.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Creates a reference with a freshly generated stable id.
    ///
    /// Used for owners that need an identity before their first save.
    pub fn with_new_id(owner_type: impl Into<String>) -> Self {
        Self::new(owner_type, Uuid::new_v4().to_string())
    }
}

impl Display for OwnerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.owner_type, self.owner_id)
    }
}

/// Record-level validation failures checked before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValidationError {
    InvalidNameLength { name: String, length: usize },
}

impl Display for PreferenceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNameLength { name, length } => write!(
                f,
                "preference name `{name}` has {length} characters; expected 1..={PREFERENCE_NAME_MAX_CHARS}"
            ),
        }
    }
}

impl Error for PreferenceValidationError {}

/// One named value scoped to one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    id: Option<PreferenceId>,
    owner: OwnerRef,
    name: String,
    value: Option<Value>,
    #[serde(skip)]
    changed: bool,
}

impl PreferenceRecord {
    /// Creates a new, unpersisted record.
    ///
    /// The value is normalized, so blank input is stored as `None`.
    pub fn new(owner: OwnerRef, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: None,
            owner,
            name: name.into(),
            value: normalize_value(value.into()),
            changed: false,
        }
    }

    /// Rebuilds a record read back from storage.
    pub fn persisted(
        id: PreferenceId,
        owner: OwnerRef,
        name: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        Self {
            id: Some(id),
            owner,
            name: name.into(),
            value: value.and_then(normalize_value),
            changed: false,
        }
    }

    pub fn id(&self) -> Option<PreferenceId> {
        self.id
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Returns whether this record has never been persisted.
    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// Returns whether a persisted record holds an uncommitted value.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Returns whether the next commit must write this record.
    pub fn is_pending(&self) -> bool {
        self.is_new_record() || self.changed
    }

    /// Assigns a new value, normalizing blanks to `None`.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        let normalized = normalize_value(value.into());
        if normalized != self.value {
            self.value = normalized;
            self.changed = !self.is_new_record();
        }
    }

    /// Checks persistence-time constraints on this record.
    pub fn validate(&self) -> Result<(), PreferenceValidationError> {
        let length = self.name.chars().count();
        if length == 0 || length > PREFERENCE_NAME_MAX_CHARS {
            return Err(PreferenceValidationError::InvalidNameLength {
                name: self.name.clone(),
                length,
            });
        }
        Ok(())
    }

    /// Records a successful write: assigns the row id and clears change state.
    pub(crate) fn mark_persisted(&mut self, id: PreferenceId) {
        self.id = Some(id);
        self.changed = false;
    }
}

/// Normalizes blank values to absence of value.
///
/// Blank means JSON null, `false`, a whitespace-only string, an empty array
/// or an empty object. `true` and every number, `0` included, are values.
pub fn normalize_value(value: Value) -> Option<Value> {
    if is_blank(&value) {
        None
    } else {
        Some(value)
    }
}

/// Returns whether a value counts as blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        Value::Bool(true) | Value::Number(_) => false,
    }
}
