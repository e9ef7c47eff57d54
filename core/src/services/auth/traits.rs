//! Collaborators the authentication flow delegates to

use async_trait::async_trait;

use crate::domain::entities::user::Principal;
use crate::errors::DomainError;

/// Checks a login credential
#[async_trait]
pub trait CredentialAuthenticator: Send + Sync {
    /// # Returns
    /// * `Ok(Principal)` - Credentials matched
    /// * `Err(DomainError::Auth(AuthError::InvalidCredentials))` - Unknown email or wrong password
    /// * `Err(DomainError::Auth(AuthError::AccountDisabled))` - Account cannot log in
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, DomainError>;
}

/// Loads users by numeric id
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Current state of a user with roles, `None` if the user no longer exists
    async fn load_by_id(&self, user_id: i64) -> Result<Option<Principal>, DomainError>;
}
