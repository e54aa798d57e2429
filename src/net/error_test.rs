use super::*;

#[test]
fn from_status_maps_known_codes() {
    assert!(matches!(ApiError::from_status(401, None), ApiError::AuthenticationExpired { .. }));
    assert!(matches!(ApiError::from_status(403, None), ApiError::AuthorizationDenied { .. }));
    assert!(matches!(ApiError::from_status(404, None), ApiError::NotFound { .. }));
    assert!(matches!(ApiError::from_status(500, None), ApiError::ServerFault { .. }));
}

#[test]
fn from_status_other_codes_keep_status_and_detail() {
    let err = ApiError::from_status(400, Some("用户名已存在".into()));
    assert_eq!(err, ApiError::Http { status: 400, detail: Some("用户名已存在".into()) });
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.detail(), Some("用户名已存在"));

    assert!(matches!(ApiError::from_status(502, None), ApiError::Http { status: 502, .. }));
}

#[test]
fn status_round_trips_for_status_variants() {
    for code in [401_u16, 403, 404, 409, 422, 500, 503] {
        assert_eq!(ApiError::from_status(code, None).status(), Some(code));
    }
}

#[test]
fn transport_variants_have_no_status_or_detail() {
    for err in [
        ApiError::Timeout,
        ApiError::NetworkUnreachable("refused".into()),
        ApiError::RequestConfiguration("bad url".into()),
        ApiError::StaleSession,
    ] {
        assert_eq!(err.status(), None);
        assert_eq!(err.detail(), None);
    }
}

#[test]
fn detail_is_exposed_for_401() {
    let err = ApiError::from_status(401, Some("无效的认证凭据".into()));
    assert_eq!(err.detail(), Some("无效的认证凭据"));
}
