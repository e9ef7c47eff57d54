//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Storage unavailable: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Shorthand for a storage-layer failure
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    /// Whether this error came from the cache or durable store
    pub fn is_storage(&self) -> bool {
        matches!(self, DomainError::Storage { .. })
    }

    /// Whether this error is an authentication failure (401-class)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DomainError::Auth(_) | DomainError::Token(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
