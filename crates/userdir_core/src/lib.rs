//! Core logic for the user directory.
//! This crate is the single source of truth for record invariants: field
//! validation, id issuance, querying and persistence of the collection.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod storage;
pub mod store;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{parse_birth_date, Gender, UnknownGender, User, UserFields, UserId};
pub use model::validation::{
    validate_fields, FieldRule, FieldViolation, UserField, ValidationError,
};
pub use query::{
    run_query, PageRequest, QueryPage, SortDirection, SortField, UserFilters, UserSort,
};
pub use storage::{KvStore, MemoryKvStore, SqliteKvStore, StorageError, StorageResult};
pub use store::{StoreError, StoreResult, SubscriptionId, UserStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
