//! Preference schema declarations.
//!
//! # Responsibility
//! - Register allowed values, defaults and nullability per owner type.
//! - Generate concrete accessors for declared names (`preference_schema!`).
//! - Validate owners' current values before commit.
//!
//! # Invariants
//! - Schema code reads preference collections but never mutates them.
//! - Validation runs only on the save path, never inside get/set.

pub mod declaration;
mod macros;
pub mod registry;
pub mod validation;
