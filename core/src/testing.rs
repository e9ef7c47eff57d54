//! Test fixtures: RSA keys and a fully wired auth stack over in-memory fakes

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::clock::{Clock, ManualClock};
use crate::domain::entities::user::{AccountStatus, Principal, Role};
use crate::repositories::{InMemoryCache, InMemoryRefreshTokenRepository};
use crate::services::auth::{AuthService, AuthServiceConfig, InMemoryUserDirectory};
use crate::services::token::{
    AccessTokenBlacklist, AccessTokenIssuer, RefreshTokenStore, Rs256KeyManager,
    TokenServiceConfig, TokenValidationPolicy,
};

pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/jwt_private_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/jwt_public_key.pem");
pub const RETIRED_PRIVATE_KEY: &str = include_str!("../tests/fixtures/jwt_private_key_retired.pem");
pub const RETIRED_PUBLIC_KEY: &str = include_str!("../tests/fixtures/jwt_public_key_retired.pem");

pub const TEST_KEY_ID: &str = "test-key-2";
pub const RETIRED_KEY_ID: &str = "test-key-1";

pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Active test key plus the retired one
pub fn test_keys() -> Arc<Rs256KeyManager> {
    let keys = Rs256KeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY, TEST_KEY_ID)
        .and_then(|k| k.with_retired_key(RETIRED_KEY_ID, RETIRED_PUBLIC_KEY))
        .expect("test fixtures are valid RSA keys");
    Arc::new(keys)
}

/// Key manager that signs with what is now the retired key
pub fn retired_signing_keys() -> Arc<Rs256KeyManager> {
    let keys = Rs256KeyManager::from_pem_strings(RETIRED_PRIVATE_KEY, RETIRED_PUBLIC_KEY, RETIRED_KEY_ID)
        .expect("test fixtures are valid RSA keys");
    Arc::new(keys)
}

pub fn test_principal(user_id: i64) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        user_id,
        email: format!("user{}@example.com", user_id),
        display_name: format!("User {}", user_id),
        roles: vec![Role::User],
        status: AccountStatus::Active,
        password_changed_at: None,
    }
}

/// Every auth component wired over in-memory stores and a manual clock
pub struct TestAuthStack {
    pub clock: Arc<ManualClock>,
    pub cache: Arc<InMemoryCache>,
    pub repository: Arc<InMemoryRefreshTokenRepository>,
    pub users: Arc<InMemoryUserDirectory>,
    pub keys: Arc<Rs256KeyManager>,
    pub config: TokenServiceConfig,
    pub issuer: Arc<AccessTokenIssuer>,
    pub refresh_store: Arc<RefreshTokenStore>,
    pub blacklist: Arc<AccessTokenBlacklist>,
    pub policy: Arc<TokenValidationPolicy>,
    pub auth: Arc<AuthService>,
}

impl TestAuthStack {
    pub fn new() -> Self {
        Self::with_config(TokenServiceConfig::default())
    }

    pub fn with_config(config: TokenServiceConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let cache = Arc::new(InMemoryCache::new(dyn_clock.clone()));
        let repository = Arc::new(InMemoryRefreshTokenRepository::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let keys = test_keys();

        let issuer = Arc::new(AccessTokenIssuer::new(keys.clone(), config.clone()));
        let refresh_store = Arc::new(RefreshTokenStore::new(
            cache.clone(),
            repository.clone(),
            config.refresh_token_lifetime(),
        ));
        let blacklist = Arc::new(AccessTokenBlacklist::new(
            cache.clone(),
            config.access_token_lifetime(),
        ));
        let policy = Arc::new(TokenValidationPolicy::with_blacklist(
            keys.clone(),
            &config,
            blacklist.clone(),
            dyn_clock.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            users.clone(),
            users.clone(),
            issuer.clone(),
            refresh_store.clone(),
            blacklist.clone(),
            dyn_clock,
            AuthServiceConfig::default(),
        ));

        Self {
            clock,
            cache,
            repository,
            users,
            keys,
            config,
            issuer,
            refresh_store,
            blacklist,
            policy,
            auth,
        }
    }

    /// Register an active user whose password was changed recently
    pub async fn add_user(&self, user_id: i64) -> Principal {
        let mut principal = test_principal(user_id);
        principal.password_changed_at = Some(self.now() - Duration::days(1));
        self.users.add_user(principal.clone(), TEST_PASSWORD).await;
        principal
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for TestAuthStack {
    fn default() -> Self {
        Self::new()
    }
}
