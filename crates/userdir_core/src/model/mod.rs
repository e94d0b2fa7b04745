//! User directory domain model.
//!
//! # Invariants
//! - A stored `User` passed `validation::validate_fields` when it was last
//!   created or updated.
//! - Identifiers are never reused within a session.

pub mod user;
pub mod validation;
