//! # Domain Services
//!
//! Stateless rule checkers. They report a verdict instead of failing, so a
//! caller can surface every problem before touching an entity.

pub mod allocation;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ErrorKind};

/// Outcome of a rule check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationResult {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }

    /// Turn a failed check into an error of the given kind carrying the reason.
    ///
    /// `ErrorKind::NotFound` has no reason-only form and is reported as a
    /// validation failure.
    ///
    /// # Errors
    ///
    /// Returns the converted error when the check did not pass.
    pub fn into_result(self, kind: ErrorKind) -> Result<(), DomainError> {
        if self.valid {
            return Ok(());
        }
        let reason = self.reason.unwrap_or_default();
        Err(match kind {
            ErrorKind::InvalidState => DomainError::InvalidState(reason),
            ErrorKind::Precondition => DomainError::Precondition(reason),
            ErrorKind::Capacity => DomainError::Capacity(reason),
            ErrorKind::Conflict => DomainError::Conflict(reason),
            ErrorKind::Validation | ErrorKind::NotFound => DomainError::Validation(reason),
        })
    }
}
