//! Tests for the access token validation chain

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::{encode, Algorithm, Header};

use crate::domain::entities::token::AccessClaims;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::services::token::{
    AccessTokenIssuer, ClaimsValidator, TokenServiceConfig, TokenValidationPolicy,
};
use crate::testing::{retired_signing_keys, test_keys, TestAuthStack, RETIRED_PRIVATE_KEY, RETIRED_PUBLIC_KEY};
use crate::services::token::Rs256KeyManager;

fn token_error(result: DomainResult<AccessClaims>) -> TokenError {
    match result {
        Err(DomainError::Token(e)) => e,
        other => panic!("expected token error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_valid_token_round_trip() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;
    let token = stack.issuer.issue(&principal, "phone", stack.now()).unwrap();

    let claims = stack.policy.validate(&token).await.unwrap();
    assert_eq!(claims.user_id, 3);
    assert_eq!(claims.device_id, "phone");
}

#[tokio::test]
async fn test_expiry_uses_injected_clock() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;
    let token = stack.issuer.issue(&principal, "d", stack.now()).unwrap();

    stack.clock.advance(Duration::seconds(1799));
    assert!(stack.policy.validate(&token).await.is_ok());

    stack.clock.advance(Duration::seconds(1));
    assert_eq!(token_error(stack.policy.validate(&token).await), TokenError::TokenExpired);
}

#[tokio::test]
async fn test_malformed_and_tampered_tokens() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;
    let token = stack.issuer.issue(&principal, "d", stack.now()).unwrap();

    assert_eq!(token_error(stack.policy.validate("garbage").await), TokenError::InvalidTokenFormat);

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let sig = parts[2].clone();
    let flipped = if sig.starts_with('A') { "B" } else { "A" };
    parts[2] = format!("{}{}", flipped, &sig[1..]);
    let tampered = parts.join(".");

    assert_eq!(token_error(stack.policy.validate(&tampered).await), TokenError::InvalidSignature);
}

#[tokio::test]
async fn test_wrong_issuer_rejected() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;

    let other = AccessTokenIssuer::new(
        test_keys(),
        TokenServiceConfig {
            issuer: "someone-else".to_string(),
            ..TokenServiceConfig::default()
        },
    );
    let token = other.issue(&principal, "d", stack.now()).unwrap();

    assert_eq!(token_error(stack.policy.validate(&token).await), TokenError::TokenInvalid);
}

#[tokio::test]
async fn test_retired_key_still_verifies() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;

    let old_issuer = AccessTokenIssuer::new(retired_signing_keys(), TokenServiceConfig::default());
    let token = old_issuer.issue(&principal, "d", stack.now()).unwrap();

    assert!(stack.policy.validate(&token).await.is_ok());
}

#[tokio::test]
async fn test_unknown_kid_rejected() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;

    let rogue_keys = Rs256KeyManager::from_pem_strings(RETIRED_PRIVATE_KEY, RETIRED_PUBLIC_KEY, "rogue").unwrap();
    let rogue = AccessTokenIssuer::new(Arc::new(rogue_keys), TokenServiceConfig::default());
    let token = rogue.issue(&principal, "d", stack.now()).unwrap();

    assert_eq!(token_error(stack.policy.validate(&token).await), TokenError::InvalidSignature);
}

#[tokio::test]
async fn test_missing_kid_uses_active_key() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;
    let claims = stack.issuer.claims_for(&principal, "d", stack.now());

    let token = encode(&Header::new(Algorithm::RS256), &claims, stack.keys.encoding_key()).unwrap();
    assert_eq!(stack.policy.validate(&token).await.unwrap(), claims);
}

#[tokio::test]
async fn test_blacklisted_token_rejected() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;
    let token = stack.issuer.issue(&principal, "d", stack.now()).unwrap();
    let claims = stack.policy.validate(&token).await.unwrap();

    stack
        .blacklist
        .blacklist(&claims.jti, claims.expires_at(), stack.now())
        .await
        .unwrap();

    assert_eq!(token_error(stack.policy.validate(&token).await), TokenError::TokenInvalid);
    // Signature and expiry alone still pass
    assert!(stack.policy.decode(&token).is_ok());
}

#[tokio::test]
async fn test_logout_all_boundary_is_inclusive() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(5).await;
    let cutoff = stack.now();

    stack.clock.set(cutoff - Duration::milliseconds(1));
    let before = stack.issuer.issue(&principal, "d", stack.now()).unwrap();

    stack.clock.set(cutoff);
    let at = stack.issuer.issue(&principal, "d", stack.now()).unwrap();
    stack.blacklist.mark_logout_all(5, cutoff).await.unwrap();

    assert_eq!(token_error(stack.policy.validate(&before).await), TokenError::TokenInvalid);
    assert!(stack.policy.validate(&at).await.is_ok());
}

#[tokio::test]
async fn test_cutoff_only_affects_its_user() {
    let stack = TestAuthStack::new();
    let alice = stack.add_user(1).await;
    let bob = stack.add_user(2).await;
    let alice_token = stack.issuer.issue(&alice, "d", stack.now()).unwrap();
    let bob_token = stack.issuer.issue(&bob, "d", stack.now()).unwrap();

    stack.clock.advance(Duration::seconds(1));
    stack.blacklist.mark_logout_all(1, stack.now()).await.unwrap();

    assert!(stack.policy.validate(&alice_token).await.is_err());
    assert!(stack.policy.validate(&bob_token).await.is_ok());
}

#[tokio::test]
async fn test_storage_failure_fails_closed() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;
    let token = stack.issuer.issue(&principal, "d", stack.now()).unwrap();

    stack.cache.set_unavailable(true);
    assert_eq!(token_error(stack.policy.validate(&token).await), TokenError::TokenInvalid);

    stack.cache.set_unavailable(false);
    assert!(stack.policy.validate(&token).await.is_ok());
}

struct AdminOnly;

#[async_trait]
impl ClaimsValidator for AdminOnly {
    async fn validate(&self, claims: &AccessClaims) -> DomainResult<()> {
        if claims.has_role(crate::domain::entities::user::Role::Admin) {
            Ok(())
        } else {
            Err(DomainError::Token(TokenError::TokenInvalid))
        }
    }
}

#[tokio::test]
async fn test_custom_validator_runs_after_signature_check() {
    let stack = TestAuthStack::new();
    let principal = stack.add_user(3).await;
    let token = stack.issuer.issue(&principal, "d", stack.now()).unwrap();

    let policy = TokenValidationPolicy::new(stack.keys.clone(), &stack.config, stack.clock.clone())
        .with_validator(Arc::new(AdminOnly));

    assert_eq!(token_error(policy.validate(&token).await), TokenError::TokenInvalid);
    assert_eq!(token_error(policy.validate("x.y.z").await), TokenError::InvalidTokenFormat);
}
