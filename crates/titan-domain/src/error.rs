//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`DomainError`], stable across message changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    InvalidState,
    Precondition,
    Capacity,
    Conflict,
    NotFound,
}

/// Domain-level errors.
///
/// Every business method either applies fully or returns one of these and
/// leaves the entity untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed input or a bounds violation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Operation is not legal in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A business rule is not yet satisfied
    #[error("Precondition not met: {0}")]
    Precondition(String),

    /// A finite resource is exhausted
    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    /// Duplicate allocation or uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },
}

impl DomainError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::Capacity(_) => ErrorKind::Capacity,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Human-readable reason without the kind prefix, suitable for API payloads
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Validation(r)
            | Self::InvalidState(r)
            | Self::Precondition(r)
            | Self::Capacity(r)
            | Self::Conflict(r) => r.clone(),
            Self::NotFound { .. } => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(DomainError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            DomainError::not_found("Unit", "abc").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::Capacity("full".into()).kind(),
            ErrorKind::Capacity
        );
    }

    #[test]
    fn test_reason_strips_prefix() {
        let err = DomainError::invalid_state("Unit is not in maintenance");
        assert_eq!(err.reason(), "Unit is not in maintenance");
        assert_eq!(err.to_string(), "Invalid state: Unit is not in maintenance");
    }
}
