//! # Service Error Types
//!
//! Unified error handling for the use-case layer. API adapters map these
//! straight onto responses via [`ServiceError::status_code`] and
//! [`ServiceError::to_payload`].

use serde_json::Value;
use thiserror::Error;
use titan_domain::{DomainError, ErrorKind};
use titan_persistence::PersistenceError;

/// Use-case level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

impl ServiceError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Get HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => match e.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::InvalidState | ErrorKind::Precondition => 422,
                ErrorKind::Capacity | ErrorKind::Conflict => 409,
                ErrorKind::NotFound => 404,
            },
            Self::Persistence(e) => match e {
                PersistenceError::NotFound { .. } => 404,
                PersistenceError::UniqueViolation { .. }
                | PersistenceError::WriteConflict { .. } => 409,
                PersistenceError::InvalidQuery(_) => 400,
                PersistenceError::Mapping(_) | PersistenceError::Serialization(_) => 500,
            },
            Self::NotFound { .. } => 404,
        }
    }

    /// Get stable error code for API payloads
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => match e.kind() {
                ErrorKind::Validation => "VALIDATION_ERROR",
                ErrorKind::InvalidState => "INVALID_STATE",
                ErrorKind::Precondition => "PRECONDITION_FAILED",
                ErrorKind::Capacity => "CAPACITY_EXCEEDED",
                ErrorKind::Conflict => "CONFLICT",
                ErrorKind::NotFound => "NOT_FOUND",
            },
            Self::Persistence(e) => match e {
                PersistenceError::NotFound { .. } => "NOT_FOUND",
                PersistenceError::UniqueViolation { .. } => "CONFLICT",
                PersistenceError::WriteConflict { .. } => "WRITE_CONFLICT",
                PersistenceError::InvalidQuery(_) => "INVALID_QUERY",
                PersistenceError::Mapping(_) | PersistenceError::Serialization(_) => {
                    "PERSISTENCE_ERROR"
                }
            },
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// Whether the caller may reasonably try the same request again later
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Domain(e) => matches!(e.kind(), ErrorKind::Capacity),
            Self::Persistence(e) => e.is_retryable(),
            Self::NotFound { .. } => false,
        }
    }

    /// Domain kind of the failure, if it came from the domain
    #[must_use]
    pub const fn domain_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Domain(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// JSON error body
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "error": {
                "message": self.to_string(),
                "code": self.error_code(),
            }
        })
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
