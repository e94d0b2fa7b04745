//! Authoritative user record store.
//!
//! # Responsibility
//! - Hold the in-memory collection for the lifetime of the process.
//! - Mediate every read and write, mirroring writes to a `KvStore`.
//! - Publish full snapshots to subscribers after each mutation.
//!
//! # Invariants
//! - One mutex covers lookup, validation, mutation and persistence.
//! - A failed persistence write never rolls back memory.
//! - Ids are never handed out twice in one session, even after delete.

use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sample;
mod user_store;

pub use user_store::{SubscriptionId, UserStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Submitted fields broke at least one rule; caller-correctable.
    Validation(ValidationError),
    /// No live record has this id; callers should re-sync their view.
    NotFound(UserId),
    /// The key-value surface failed. Only surfaced by explicit flushes.
    Persistence(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::Persistence(err) => write!(f, "failed to persist users: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Persistence(value)
    }
}
