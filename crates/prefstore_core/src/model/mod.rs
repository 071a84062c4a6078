//! Preference domain model.
//!
//! # Responsibility
//! - Define the stored preference unit and its owner back-reference.
//! - Define the per-owner in-memory collection with deferred persistence.
//!
//! # Invariants
//! - A collection holds at most one record per name.
//! - Blank values are never stored; they normalize to `None`.

pub mod collection;
pub mod preference;
