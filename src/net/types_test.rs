use super::*;
use serde_json::json;

#[test]
fn profile_keeps_unknown_fields() {
    let raw = json!({
        "id": 7,
        "username": "alice",
        "email": "alice@example.com",
        "created_at": "2024-01-01T00:00:00",
        "role": "enterprise"
    });
    let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.extra.get("role"), Some(&json!("enterprise")));
    assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
}

#[test]
fn profile_created_at_is_optional() {
    let profile: UserProfile =
        serde_json::from_value(json!({"id": 1, "username": "bob", "email": "b@x.io"})).unwrap();
    assert!(profile.created_at.is_none());
    assert!(profile.extra.is_empty());
}

#[test]
fn token_response_token_type_optional() {
    let token: TokenResponse = serde_json::from_value(json!({"access_token": "jwt"})).unwrap();
    assert_eq!(token.access_token, "jwt");
    assert!(token.token_type.is_none());
}

#[test]
fn credentials_debug_redacts_password() {
    let login = LoginRequest { username: "alice".into(), password: "hunter2".into() };
    let rendered = format!("{login:?}");
    assert!(rendered.contains("alice"));
    assert!(!rendered.contains("hunter2"));

    let register = RegisterRequest { username: "a".into(), email: "a@b.c".into(), password: "hunter2".into() };
    assert!(!format!("{register:?}").contains("hunter2"));
}

#[test]
fn error_detail_only_accepts_strings() {
    assert_eq!(error_detail(&json!({"detail": "用户名或密码错误"})).as_deref(), Some("用户名或密码错误"));
    assert_eq!(error_detail(&json!({"detail": [{"loc": ["body"], "msg": "field required"}]})), None);
    assert_eq!(error_detail(&json!({"detail": "   "})), None);
    assert_eq!(error_detail(&json!(null)), None);
}
