//! Owner-side preference capability.
//!
//! # Responsibility
//! - Define the `Preferrer` trait an owner type implements to hold preferences.
//! - Resolve generic `<name>_preference` / `<name>_preference=` accessor calls.
//!
//! # Invariants
//! - Every get/set is delegated to the owner's `PreferenceCollection`.
//! - Accessor arity errors are raised before any state changes.

pub mod accessor;
pub mod preferrer;
