//! Per-owner in-memory preference collection.
//!
//! # Responsibility
//! - Hold the owner's preference records in first-set order.
//! - Apply get/set by name without touching storage.
//! - Expose pending records to the commit path and accept reloads.
//!
//! # Invariants
//! - At most one record per name (exact, case-sensitive string match).
//! - Every record references the collection's owner.
//! - `set` never writes through to storage.

use crate::model::preference::{OwnerRef, PreferenceId, PreferenceRecord};
use serde_json::Value;
use std::fmt::Display;

/// Result of applying several named values at once.
#[derive(Debug, PartialEq)]
pub enum SetOutcome<'a> {
    /// The mapping was empty; nothing changed.
    Empty,
    /// Exactly one name was set.
    One(&'a PreferenceRecord),
    /// Several names were set, in application order.
    Many(Vec<&'a PreferenceRecord>),
}

impl<'a> SetOutcome<'a> {
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Flattens the outcome into a record list.
    pub fn records(&self) -> Vec<&'a PreferenceRecord> {
        match self {
            Self::Empty => vec![],
            Self::One(record) => vec![*record],
            Self::Many(records) => records.clone(),
        }
    }
}

/// Ordered preference records owned by exactly one owner instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceCollection {
    owner: OwnerRef,
    records: Vec<PreferenceRecord>,
}

impl PreferenceCollection {
    /// Creates an empty collection for an owner.
    pub fn new(owner: OwnerRef) -> Self {
        Self {
            owner,
            records: Vec::new(),
        }
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    /// Sets one preference, updating in place or appending a new record.
    ///
    /// Names are compared by their string form, so `1` and `"1"` address the
    /// same record.
    pub fn set(&mut self, name: impl Display, value: impl Into<Value>) -> &PreferenceRecord {
        let index = self.set_at(name.to_string(), value.into());
        &self.records[index]
    }

    /// Sets every entry of a mapping, in its iteration order.
    ///
    /// Values are stored verbatim; a nested mapping becomes one record.
    pub fn set_many<I, K, V>(&mut self, named_values: I) -> SetOutcome<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Into<Value>,
    {
        let indices = named_values
            .into_iter()
            .map(|(name, value)| self.set_at(name.to_string(), value.into()))
            .collect::<Vec<_>>();

        match indices.as_slice() {
            [] => SetOutcome::Empty,
            [index] => SetOutcome::One(&self.records[*index]),
            many => SetOutcome::Many(many.iter().map(|index| &self.records[*index]).collect()),
        }
    }

    /// Returns the value stored under `name`, or `None` when unset or null.
    pub fn get(&self, name: impl Display) -> Option<&Value> {
        self.record(name).and_then(PreferenceRecord::value)
    }

    /// Returns the record stored under `name`.
    pub fn record(&self, name: impl Display) -> Option<&PreferenceRecord> {
        let name = name.to_string();
        self.records.iter().find(|record| record.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreferenceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns records that the next commit must write.
    pub fn pending(&self) -> Vec<&PreferenceRecord> {
        self.records
            .iter()
            .filter(|record| record.is_pending())
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.records.iter().any(PreferenceRecord::is_pending)
    }

    /// Replaces in-memory state with the persisted records.
    ///
    /// Unpersisted records are dropped and changed values revert. Records
    /// belonging to another owner are ignored.
    pub fn reload(&mut self, persisted: Vec<PreferenceRecord>) {
        self.records = persisted
            .into_iter()
            .filter(|record| record.owner() == &self.owner && !record.is_new_record())
            .collect();
    }

    pub(crate) fn pending_entries(&self) -> Vec<(usize, &PreferenceRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.is_pending())
            .collect()
    }

    /// Applies the ids written by a successful commit.
    pub(crate) fn mark_committed(&mut self, written: &[(usize, PreferenceId)]) {
        for (index, id) in written {
            if let Some(record) = self.records.get_mut(*index) {
                record.mark_persisted(*id);
            }
        }
    }

    fn set_at(&mut self, name: String, value: Value) -> usize {
        if let Some(index) = self
            .records
            .iter()
            .position(|record| record.name() == name)
        {
            self.records[index].set_value(value);
            return index;
        }

        self.records
            .push(PreferenceRecord::new(self.owner.clone(), name, value));
        self.records.len() - 1
    }
}
