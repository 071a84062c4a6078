//! Core use-case services.
//!
//! # Responsibility
//! - Tie owner saves, reloads and destroys to preference persistence.
//! - Keep callers decoupled from transaction handling.

pub mod preference_service;
