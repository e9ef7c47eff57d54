//! Unit tests for domain entities

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use super::*;

fn principal() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        user_id: 42,
        email: "analyst@example.com".to_string(),
        display_name: "Analyst".to_string(),
        roles: vec![Role::User],
        status: AccountStatus::Active,
        password_changed_at: None,
    }
}

#[test]
fn test_normalize_device_id() {
    assert_eq!(normalize_device_id(None), DEFAULT_DEVICE_ID);
    assert_eq!(normalize_device_id(Some("")), DEFAULT_DEVICE_ID);
    assert_eq!(normalize_device_id(Some("   \t")), DEFAULT_DEVICE_ID);
    assert_eq!(normalize_device_id(Some(" laptop-1 ")), "laptop-1");
}

#[test]
fn test_role_wire_format() {
    let json = serde_json::to_string(&vec![Role::User, Role::Admin]).unwrap();
    assert_eq!(json, r#"["ROLE_USER","ROLE_ADMIN"]"#);

    let parsed: Result<Vec<Role>, _> = serde_json::from_str(r#"["ROLE_SUPERUSER"]"#);
    assert!(parsed.is_err());

    assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    assert!("guest".parse::<Role>().is_err());
}

#[test]
fn test_access_claims_wire_names() {
    let claims = AccessClaims {
        sub: Uuid::nil().to_string(),
        user_id: 7,
        email: "a@example.com".to_string(),
        roles: vec![Role::User],
        device_id: "phone".to_string(),
        jti: "jti-1".to_string(),
        iss: "reporthub".to_string(),
        iat: 1_700_000_000,
        iat_ms: 1_700_000_000_123,
        exp: 1_700_001_800,
    };

    let value = serde_json::to_value(&claims).unwrap();
    assert_eq!(value["userId"], 7);
    assert_eq!(value["deviceId"], "phone");
    assert_eq!(value["roles"][0], "ROLE_USER");
    assert_eq!(claims.issued_at().timestamp_millis(), 1_700_000_000_123);
    assert!(!claims.is_expired_at(Utc.timestamp_opt(1_700_001_799, 0).unwrap()));
    assert!(claims.is_expired_at(Utc.timestamp_opt(1_700_001_800, 0).unwrap()));
}

#[test]
fn test_refresh_record_never_serializes_token() {
    let now = Utc::now();
    let record = RefreshTokenRecord::new(
        "raw-secret".to_string(),
        1,
        "default".to_string(),
        None,
        Some("10.0.0.1".to_string()),
        now,
        Duration::days(14),
    );

    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("raw-secret"));

    let back: RefreshTokenRecord = serde_json::from_str(&json).unwrap();
    assert!(back.token.is_empty());
    assert_eq!(back.expires_at, now + Duration::days(14));
}

#[test]
fn test_refresh_record_expiry_boundary() {
    let now = Utc::now();
    let record = RefreshTokenRecord::new(
        "t".to_string(),
        1,
        "d".to_string(),
        None,
        None,
        now,
        Duration::seconds(10),
    );

    assert!(!record.is_expired_at(now + Duration::seconds(9)));
    assert!(record.is_expired_at(now + Duration::seconds(10)));
    assert_eq!(record.remaining(now + Duration::seconds(4)), Duration::seconds(6));
    assert_eq!(record.remaining(now + Duration::seconds(20)), Duration::zero());
}

#[test]
fn test_stored_token_round_trips_device() {
    let now = Utc::now();
    let record = RefreshTokenRecord::new(
        "t".to_string(),
        9,
        "tablet".to_string(),
        Some("Safari".to_string()),
        None,
        now,
        Duration::days(1),
    );
    let stored = StoredRefreshToken::from_record(&record, "abc".to_string());
    assert!(stored.is_active_at(now));

    let rebuilt = RefreshTokenRecord::from_stored("t".to_string(), &stored);
    assert_eq!(rebuilt, record);
}

#[test]
fn test_password_expiry() {
    let now = Utc::now();
    let mut user = principal();
    assert!(user.is_password_expired(now, 90));

    user.password_changed_at = Some(now - Duration::days(89));
    assert!(!user.is_password_expired(now, 90));

    user.password_changed_at = Some(now - Duration::days(90));
    assert!(user.is_password_expired(now, 90));
    assert!(!user.is_password_expired(now, 0));
}

#[test]
fn test_primary_role_and_status() {
    let mut user = principal();
    assert_eq!(user.primary_role(), Role::User);
    user.roles.push(Role::Admin);
    assert_eq!(user.primary_role(), Role::Admin);

    assert!(user.is_active());
    user.status = "pending".parse().unwrap();
    assert!(!user.is_active());
}
