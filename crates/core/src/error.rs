//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// These are the user-facing failures of the tracker: every one of them
/// aborts the operation before anything is written. Storage failures are
/// infrastructure concerns and live in `pocketledger-storage`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request collides with existing state (duplicate registration,
    /// missing OTP, stale record version).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced account does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Wrong password or one-time code.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
