//! Unit tests for access token claims.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::Claims;

#[test]
fn test_claims_new_sets_correct_fields() {
    let user_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let claims = Claims::new(user_id, "accountant", expires_at);

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.role, "accountant");
    assert!(claims.iat <= Utc::now().timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
}

#[test]
fn test_claims_user_id_returns_sub() {
    let user_id = Uuid::new_v4();
    let claims = Claims::new(user_id, "viewer", Utc::now() + Duration::hours(1));

    assert_eq!(claims.user_id(), user_id);
}

#[test]
fn test_claims_iat_is_current_time() {
    let before = Utc::now().timestamp();
    let claims = Claims::new(Uuid::new_v4(), "admin", Utc::now() + Duration::hours(1));
    let after = Utc::now().timestamp();

    assert!(claims.iat >= before);
    assert!(claims.iat <= after);
}

#[test]
fn test_claims_serde_roundtrip_keeps_subject() {
    let claims = Claims::new(Uuid::new_v4(), "admin", Utc::now() + Duration::hours(1));
    let json = serde_json::to_string(&claims).unwrap();
    let parsed: Claims = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.sub, claims.sub);
    assert_eq!(parsed.exp, claims.exp);
}
