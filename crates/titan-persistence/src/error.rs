//! Persistence layer error types

use thiserror::Error;
use titan_domain::DomainError;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Entity not found: {entity_type} with key {key}")]
    NotFound { entity_type: String, key: String },

    #[error("Unique constraint violated: {entity_type} named '{name}' already exists")]
    UniqueViolation { entity_type: String, name: String },

    /// Optimistic concurrency check failed; reload and retry
    #[error("Write conflict on {entity_type} {id}: expected version {expected}, found {actual}")]
    WriteConflict {
        entity_type: String,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// A stored record no longer satisfies the domain rules
    #[error("Stored record failed domain mapping: {0}")]
    Mapping(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),
}

impl PersistenceError {
    pub fn not_found(entity_type: &str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            key: key.to_string(),
        }
    }

    /// Whether reloading and repeating the operation may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::WriteConflict { .. })
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
