//! Error taxonomy for authentication and token lifecycle operations

use rh_shared::errors::{error_codes, ErrorResponse};
use thiserror::Error;

/// Authentication failures surfaced by the login / refresh flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled or not verified")]
    AccountDisabled,

    #[error("Refresh token is invalid or expired")]
    InvalidOrExpiredRefreshToken,
}

/// Access token and signing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Blacklisted, issued before a logout-all cutoff, or revocation status unknown
    #[error("Token is no longer valid")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Failed to load signing key: {message}")]
    KeyLoadError { message: String },
}

impl AuthError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AuthError::AccountDisabled => error_codes::ACCOUNT_DISABLED,
            AuthError::InvalidOrExpiredRefreshToken => error_codes::INVALID_REFRESH_TOKEN,
        }
    }
}

impl TokenError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::TokenInvalid => error_codes::TOKEN_INVALID,
            TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
            TokenError::InvalidTokenFormat => error_codes::INVALID_TOKEN_FORMAT,
            TokenError::InvalidSignature => error_codes::INVALID_SIGNATURE,
            TokenError::TokenGenerationFailed => error_codes::TOKEN_GENERATION_FAILED,
            TokenError::KeyLoadError { .. } => error_codes::INTERNAL_ERROR,
        }
    }
}

/// Convert AuthError to ErrorResponse
impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

/// Convert TokenError to ErrorResponse
impl From<&TokenError> for ErrorResponse {
    fn from(err: &TokenError) -> Self {
        match err {
            // Key material details stay in the logs
            TokenError::KeyLoadError { .. } => {
                ErrorResponse::new(err.code(), "Token service unavailable")
            }
            _ => ErrorResponse::new(err.code(), err.to_string()),
        }
    }
}

impl From<&super::DomainError> for ErrorResponse {
    fn from(err: &super::DomainError) -> Self {
        use super::DomainError;

        match err {
            DomainError::Auth(auth) => auth.into(),
            DomainError::Token(token) => token.into(),
            DomainError::Validation { message } => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, message.clone())
            }
            DomainError::NotFound { resource } => {
                ErrorResponse::new(error_codes::NOT_FOUND, format!("{} not found", resource))
            }
            DomainError::Storage { .. } => ErrorResponse::new(
                error_codes::STORAGE_UNAVAILABLE,
                "Authentication storage is temporarily unavailable",
            ),
            DomainError::Internal { .. } => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
            }
        }
    }
}
