//! Per-owner-type preference schema tables.
//!
//! # Responsibility
//! - Track which owner types opted into preferences.
//! - Hold declared rules, keyed by owner type and preference name.
//!
//! # Invariants
//! - Declarations against a type that has not opted in are rejected.
//! - Redeclaring a name replaces the earlier rules (last declaration wins).
//! - Batch declarations apply to every listed type or to none.

use crate::model::collection::PreferenceCollection;
use crate::owner::preferrer::Preferrer;
use crate::schema::declaration::{AllowedValues, PreferenceDeclaration, PreferenceOptions};
use crate::schema::validation::ValidationErrors;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Declaration-time schema misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    PreferencesNotEnabled { owner_type: String },
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreferencesNotEnabled { owner_type } => write!(
                f,
                "owner type `{owner_type}` has not enabled preferences; enable it before declaring"
            ),
        }
    }
}

impl Error for ConfigurationError {}

/// Declared preference rules for one owner type.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceSchema {
    owner_type: String,
    declarations: BTreeMap<String, PreferenceDeclaration>,
}

impl PreferenceSchema {
    pub fn new(owner_type: impl Into<String>) -> Self {
        Self {
            owner_type: owner_type.into(),
            declarations: BTreeMap::new(),
        }
    }

    pub fn owner_type(&self) -> &str {
        &self.owner_type
    }

    /// Declares (or redeclares) one preference name.
    pub fn declare(&mut self, name: impl Into<String>, options: PreferenceOptions) -> &mut Self {
        let name = name.into();
        self.declarations
            .insert(name.clone(), PreferenceDeclaration::new(name, options));
        self
    }

    pub fn declaration(&self, name: &str) -> Option<&PreferenceDeclaration> {
        self.declarations.get(name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &PreferenceDeclaration> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn allowed_values(&self, name: &str) -> Option<&AllowedValues> {
        self.declaration(name)
            .and_then(PreferenceDeclaration::allowed_values)
    }

    /// Reads `name` from a collection, applying the declared default.
    ///
    /// Undeclared names return the stored value unchanged.
    pub fn resolve(&self, preferences: &PreferenceCollection, name: &str) -> Option<Value> {
        let stored = preferences.get(name);
        match self.declaration(name) {
            Some(declaration) => declaration.resolve(stored),
            None => stored.cloned(),
        }
    }

    /// Runs every declared rule against the collection's current values.
    pub fn validate(&self, preferences: &PreferenceCollection, errors: &mut ValidationErrors) {
        for declaration in self.declarations.values() {
            declaration.validate(preferences.get(declaration.name()), errors);
        }
    }
}

/// Names and options applied together by `SchemaRegistry::preference_for`.
#[derive(Debug, Clone, Default)]
pub struct DeclarationBlock {
    entries: Vec<(String, PreferenceOptions)>,
}

impl DeclarationBlock {
    pub fn preference(&mut self, name: impl Into<String>, options: PreferenceOptions) -> &mut Self {
        self.entries.push((name.into(), options));
        self
    }
}

/// Registration table of preference schemas for all enabled owner types.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, PreferenceSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opts an owner type into preferences. Repeated calls are no-ops.
    pub fn enable(&mut self, owner_type: &str) -> &mut PreferenceSchema {
        self.schemas
            .entry(owner_type.to_string())
            .or_insert_with(|| PreferenceSchema::new(owner_type))
    }

    /// Opts a `Preferrer` implementation in by its type tag.
    pub fn enable_type<P: Preferrer>(&mut self) -> &mut PreferenceSchema {
        self.enable(P::PREFERRER_TYPE)
    }

    pub fn is_enabled(&self, owner_type: &str) -> bool {
        self.schemas.contains_key(owner_type)
    }

    /// Declares one preference on an enabled owner type.
    pub fn declare_preference(
        &mut self,
        owner_type: &str,
        name: impl Into<String>,
        options: PreferenceOptions,
    ) -> Result<&mut PreferenceSchema, ConfigurationError> {
        let schema = self.schemas.get_mut(owner_type).ok_or_else(|| {
            ConfigurationError::PreferencesNotEnabled {
                owner_type: owner_type.to_string(),
            }
        })?;
        schema.declare(name, options);
        Ok(schema)
    }

    /// Applies one declaration block to several owner types.
    ///
    /// Every owner type is checked before anything is declared.
    pub fn preference_for(
        &mut self,
        owner_types: &[&str],
        declare: impl FnOnce(&mut DeclarationBlock),
    ) -> Result<(), ConfigurationError> {
        if let Some(missing) = owner_types.iter().find(|owner_type| !self.is_enabled(owner_type)) {
            return Err(ConfigurationError::PreferencesNotEnabled {
                owner_type: (*missing).to_string(),
            });
        }

        let mut block = DeclarationBlock::default();
        declare(&mut block);

        for owner_type in owner_types {
            for (name, options) in &block.entries {
                self.declare_preference(owner_type, name.clone(), options.clone())?;
            }
        }
        Ok(())
    }

    pub fn schema(&self, owner_type: &str) -> Option<&PreferenceSchema> {
        self.schemas.get(owner_type)
    }

    /// Snapshots one schema for owners that keep it alongside their state.
    pub fn shared(&self, owner_type: &str) -> Option<Arc<PreferenceSchema>> {
        self.schema(owner_type).cloned().map(Arc::new)
    }

    /// Returns enabled owner type tags in sorted order.
    pub fn owner_types(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }
}
