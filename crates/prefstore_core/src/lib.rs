//! Preference attributes for owner entities.
//!
//! Owners opt in through [`Preferrer`], stage named values in a
//! [`PreferenceCollection`], and commit them with [`PreferenceService::save`]
//! in the same transaction as the owner itself. Declared names get typed
//! accessors, defaults and save-time rules via [`preference_schema!`] or a
//! runtime [`SchemaRegistry`].

pub mod db;
pub mod logging;
pub mod model;
pub mod owner;
pub mod repo;
pub mod schema;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::collection::{PreferenceCollection, SetOutcome};
pub use model::preference::{
    is_blank, normalize_value, OwnerRef, PreferenceId, PreferenceRecord,
    PreferenceValidationError, PREFERENCE_NAME_MAX_CHARS,
};
pub use owner::accessor::{parse_accessor, AccessorCall, AccessorError, AccessorKind};
pub use owner::preferrer::{PreferenceSchemaSource, Preferrer};
pub use repo::preference_repo::{
    PreferenceRepository, RepoError, RepoResult, SqlitePreferenceRepository,
};
pub use schema::declaration::{AllowedValues, PreferenceDeclaration, PreferenceOptions};
pub use schema::registry::{
    ConfigurationError, DeclarationBlock, PreferenceSchema, SchemaRegistry,
};
pub use schema::validation::{FieldError, ValidationErrors};
pub use service::preference_service::{CommitReport, PreferenceService, SaveError};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
    pub use paste::paste;
    pub use serde_json::Value;
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
