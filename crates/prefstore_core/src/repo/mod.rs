//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record-store contract used by the preference lifecycle.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `PreferenceRecord::validate()` before persistence.
//! - Duplicate creates return `RepoError::DuplicatePreference`, never a raw
//!   constraint error.

pub mod preference_repo;
