//! In-memory user directory for testing

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::user::{AccountStatus, Principal, Role};
use crate::errors::{AuthError, DomainError};

use super::traits::{CredentialAuthenticator, UserDirectory};

#[derive(Debug, Clone)]
struct StoredUser {
    principal: Principal,
    password: String,
}

/// Users keyed by numeric id, with plaintext passwords
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<i64, StoredUser>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn add_user(&self, principal: Principal, password: impl Into<String>) {
        self.users.write().await.insert(
            principal.user_id,
            StoredUser {
                principal,
                password: password.into(),
            },
        );
    }

    pub async fn set_status(&self, user_id: i64, status: AccountStatus) {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.principal.status = status;
        }
    }

    pub async fn set_roles(&self, user_id: i64, roles: Vec<Role>) {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.principal.roles = roles;
        }
    }

    pub async fn remove_user(&self, user_id: i64) {
        self.users.write().await.remove(&user_id);
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialAuthenticator for InMemoryUserDirectory {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, DomainError> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.principal.email.eq_ignore_ascii_case(email))
            .filter(|u| u.password == password)
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        if !user.principal.is_active() {
            return Err(DomainError::Auth(AuthError::AccountDisabled));
        }
        Ok(user.principal.clone())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn load_by_id(&self, user_id: i64) -> Result<Option<Principal>, DomainError> {
        Ok(self.users.read().await.get(&user_id).map(|u| u.principal.clone()))
    }
}
