//! Integration tests for admin login, logout, refresh and the request gate.
//!
//! These tests drive the full router and verify that:
//! - A successful login sets a session cookie that opens the admin area
//! - Every admin path except the login page redirects without a session
//! - Bad, expired or forged cookies redirect and are cleared
//! - Logout is idempotent and refresh extends the session

#![cfg(feature = "sqlite")]

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use common::{
    PASSWORD, SECRET, TestFixture, USERNAME, body_bytes, cookie_pair, json_body, location,
    set_cookie,
};
use folio::admin::TokenService;

fn token_cookie(token: &str) -> String {
    format!("admin_token={token}")
}

#[tokio::test]
async fn test_login_then_admin_access() {
    let fixture = TestFixture::new().await;

    let response = fixture.login(USERNAME, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let header = set_cookie(&response).unwrap();
    assert!(header.starts_with("admin_token="));
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));
    assert!(header.contains("Path=/"));
    assert!(header.contains("Max-Age=86400"));
    // Development config: no Secure attribute
    assert!(!header.contains("Secure"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);

    let cookie = cookie_pair(&header);
    let dashboard = fixture.get("/admin/dashboard", Some(&cookie)).await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(dashboard).await).unwrap();
    assert!(html.contains(USERNAME));

    let session = fixture.get("/admin/api/session", Some(&cookie)).await;
    assert_eq!(session.status(), StatusCode::OK);
    let body = json_body(session).await;
    assert_eq!(body["data"]["username"], USERNAME);
}

#[tokio::test]
async fn test_admin_paths_redirect_without_session() {
    let fixture = TestFixture::new().await;

    for path in [
        "/admin/dashboard",
        "/admin/api/session",
        "/admin/api/skills",
        "/admin/does-not-exist",
        "/admin",
    ] {
        let response = fixture.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/admin/login", "{path}");
        assert!(set_cookie(&response).is_none(), "{path}");
    }
}

#[tokio::test]
async fn test_login_page_is_public() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/admin/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("/api/auth/login"));

    // Already logged in: straight to the dashboard
    let cookie = fixture.session_cookie().await;
    let response = fixture.get("/admin/login", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/dashboard");
}

#[tokio::test]
async fn test_admin_root_redirects_to_dashboard_with_session() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.session_cookie().await;

    for path in ["/admin", "/admin/"] {
        let response = fixture.get(path, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/dashboard");
    }
}

#[tokio::test]
async fn test_public_paths_are_not_gated() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Shares the prefix text but not the path segment
    let response = fixture.get("/administrator", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_with_empty_password() {
    let fixture = TestFixture::new().await;

    let response = fixture.login(USERNAME, "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie(&response).is_none());

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "password");
}

#[tokio::test]
async fn test_login_with_wrong_credentials() {
    let fixture = TestFixture::new().await;

    let response = fixture.login(USERNAME, "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());

    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid username or password.");
}

#[tokio::test]
async fn test_login_with_malformed_body() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .send_json("POST", "/api/auth/login", None, &json!("not an object"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn test_login_when_identity_not_configured() {
    let fixture = TestFixture::with_admin(Some(USERNAME), None).await;

    let response = fixture.login(USERNAME, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookie(&response).is_none());

    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        "Authentication service is currently unavailable."
    );
}

#[tokio::test]
async fn test_expired_cookie_redirects_and_clears() {
    let fixture = TestFixture::new().await;
    let tokens = TokenService::new(SECRET, Duration::hours(24)).unwrap();
    let stale = tokens
        .issue_at(USERNAME, Utc::now() - Duration::hours(25))
        .unwrap();

    let response = fixture
        .get("/admin/dashboard", Some(&token_cookie(&stale)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");

    let cleared = set_cookie(&response).expect("stale cookie is cleared");
    assert!(cleared.starts_with("admin_token=;"));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_forged_cookie_redirects_and_clears() {
    let fixture = TestFixture::new().await;
    let forged = TokenService::new("some-other-secret", Duration::hours(24))
        .unwrap()
        .issue(USERNAME)
        .unwrap();

    let response = fixture
        .get("/admin/api/session", Some(&token_cookie(&forged)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.session_cookie().await;

    let first = fixture.post("/api/auth/logout", Some(&cookie)).await;
    let second = fixture.post("/api/auth/logout", None).await;

    for response in [first, second] {
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = set_cookie(&response).unwrap();
        assert!(cleared.starts_with("admin_token=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(json_body(response).await["success"], true);
    }
}

#[tokio::test]
async fn test_refresh_extends_session() {
    let fixture = TestFixture::new().await;
    let tokens = TokenService::new(SECRET, Duration::hours(24)).unwrap();
    let issued_at = Utc::now() - Duration::hours(2);
    let original = tokens.issue_at(USERNAME, issued_at).unwrap();
    let original_exp = tokens.verify(&original).unwrap().exp;

    let response = fixture
        .post("/api/auth/refresh", Some(&token_cookie(&original)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let refreshed = cookie_pair(&set_cookie(&response).unwrap());
    let token = refreshed.strip_prefix("admin_token=").unwrap();
    let claims = tokens.verify(token).unwrap();
    assert_eq!(claims.sub, USERNAME);
    assert!(claims.exp > original_exp);

    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], USERNAME);
}

#[tokio::test]
async fn test_refresh_rejects_expired_or_missing_session() {
    let fixture = TestFixture::new().await;
    let tokens = TokenService::new(SECRET, Duration::hours(24)).unwrap();
    let stale = tokens
        .issue_at(USERNAME, Utc::now() - Duration::hours(30))
        .unwrap();

    let response = fixture
        .post("/api/auth/refresh", Some(&token_cookie(&stale)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));

    let response = fixture.post("/api/auth/refresh", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_forged_session() {
    let fixture = TestFixture::new().await;
    let forged = TokenService::new("some-other-secret", Duration::hours(24))
        .unwrap()
        .issue(USERNAME)
        .unwrap();

    for cookie in [token_cookie(&forged), token_cookie("not-a-token")] {
        let response = fixture.post("/api/auth/refresh", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cleared = set_cookie(&response).unwrap();
        assert!(cleared.starts_with("admin_token=;"));
        assert!(cleared.contains("Max-Age=0"));
    }
}

#[tokio::test]
async fn test_login_page_reports_stale_session() {
    let fixture = TestFixture::new().await;
    let tokens = TokenService::new(SECRET, Duration::hours(24)).unwrap();
    let stale = tokens
        .issue_at(USERNAME, Utc::now() - Duration::hours(25))
        .unwrap();

    let response = fixture
        .get("/admin/login", Some(&token_cookie(&stale)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Your session has expired."));

    // A fresh visit carries no notice
    let response = fixture.get("/admin/login", None).await;
    assert!(set_cookie(&response).is_none());
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(!html.contains("Your session has expired."));
}
