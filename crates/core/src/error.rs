//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record does not exist. The message names the missing id.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness conflict (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure at the domain boundary.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = DomainError::not_found("user with id 123 not found");
        assert_eq!(err.to_string(), "not found: user with id 123 not found");

        let err = DomainError::conflict("email already registered: a@b.c");
        assert!(err.to_string().contains("a@b.c"));
    }

    #[test]
    fn helpers_produce_matching_variants() {
        assert!(matches!(
            DomainError::validation("x"),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            DomainError::invalid_id("x"),
            DomainError::InvalidId(_)
        ));
        assert!(matches!(
            DomainError::unauthorized("x"),
            DomainError::Unauthorized(_)
        ));
    }
}
