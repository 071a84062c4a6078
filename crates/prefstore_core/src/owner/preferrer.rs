//! Preference capability for owner entities.

use crate::model::collection::{PreferenceCollection, SetOutcome};
use crate::model::preference::{OwnerRef, PreferenceRecord};
use crate::owner::accessor::{parse_accessor, AccessorError, AccessorKind};
use crate::repo::preference_repo::RepoResult;
use crate::schema::registry::PreferenceSchema;
use crate::schema::validation::ValidationErrors;
use rusqlite::Connection;
use serde_json::Value;
use std::fmt::Display;

/// Source of the declared rules an owner is validated against.
///
/// `preference_schema!` implements this for the owner type it declares.
/// Owners without declarations use an empty impl; owners backed by a
/// `SchemaRegistry` return their shared schema.
pub trait PreferenceSchemaSource {
    /// Declared rules for this owner, consulted by accessors and saves.
    fn preference_schema(&self) -> Option<&PreferenceSchema> {
        None
    }
}

/// Capability granted to an owner type that holds preferences.
///
/// Implementors provide the type tag and the collection; everything else has
/// a default. The lifecycle hooks (`validate_owner`, `persist_owner`,
/// `destroy_owner`) are where the owner's own storage plugs into
/// `PreferenceService` saves and destroys.
pub trait Preferrer: PreferenceSchemaSource {
    /// Owner type tag stored with every preference record.
    const PREFERRER_TYPE: &'static str;

    fn preferences(&self) -> &PreferenceCollection;

    fn preferences_mut(&mut self) -> &mut PreferenceCollection;

    /// Adds the owner's own validation failures.
    fn validate_owner(&self, _errors: &mut ValidationErrors) {}

    /// Writes the owner's own row inside the save transaction.
    fn persist_owner(&self, _conn: &Connection) -> RepoResult<()> {
        Ok(())
    }

    /// Removes the owner's own row inside the destroy transaction.
    fn destroy_owner(&self, _conn: &Connection) -> RepoResult<()> {
        Ok(())
    }

    fn owner_ref(&self) -> &OwnerRef {
        self.preferences().owner()
    }

    /// Creates an empty collection tagged with this owner type.
    fn new_preferences(owner_id: impl Into<String>) -> PreferenceCollection
    where
        Self: Sized,
    {
        PreferenceCollection::new(OwnerRef::new(Self::PREFERRER_TYPE, owner_id))
    }

    fn get_preference(&self, name: impl Display) -> Option<&Value> {
        self.preferences().get(name)
    }

    fn set_preference(&mut self, name: impl Display, value: impl Into<Value>) -> &PreferenceRecord {
        self.preferences_mut().set(name, value)
    }

    fn set_preferences<I, K, V>(&mut self, named_values: I) -> SetOutcome<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Into<Value>,
    {
        self.preferences_mut().set_many(named_values)
    }

    /// Resolves a `<name>_preference` / `<name>_preference=` call.
    ///
    /// Getters return the stored value, with the declared default applied
    /// when the schema declares the name. Setters return the normalized value
    /// that was stored.
    fn dispatch_preference(
        &mut self,
        accessor: &str,
        args: &[Value],
    ) -> Result<Option<Value>, AccessorError> {
        let call = parse_accessor(accessor)
            .ok_or_else(|| AccessorError::NoSuchAccessor(accessor.to_string()))?;
        call.check_arity(args.len())?;

        match call.kind {
            AccessorKind::Getter => Ok(match self.preference_schema() {
                Some(schema) => schema.resolve(self.preferences(), &call.name),
                None => self.get_preference(&call.name).cloned(),
            }),
            AccessorKind::Setter => {
                let record = self.set_preference(&call.name, args[0].clone());
                Ok(record.value().cloned())
            }
        }
    }
}
