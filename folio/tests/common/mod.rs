//! Shared fixture for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use folio::config::{AdminConfig, Config};
use folio::db::Database;
use folio::server::http_router;
use folio::state::AppState;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "correct-horse-battery";
pub const SECRET: &str = "integration-test-secret";

/// A full application router over a temp-dir database.
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub state: Arc<AppState>,
    app: Router,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_admin(Some(USERNAME), Some(PASSWORD)).await
    }

    pub async fn with_admin(username: Option<&str>, password: Option<&str>) -> Self {
        let temp_dir = TempDir::new().unwrap();

        let mut config = Config::default();
        config.admin = AdminConfig {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        };
        config.auth.jwt_secret = Some(SECRET.to_string());
        config.cache.page_ttl_secs = 0;

        let db = Database::new(&config.database, temp_dir.path()).await.unwrap();
        let state = Arc::new(AppState::from_config(&config, db.pool(), temp_dir.path()).unwrap());
        let app = http_router(state.clone());

        Self {
            temp_dir,
            state,
            app,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: &Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        self.send_json(
            "POST",
            "/api/auth/login",
            None,
            &serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Log in with the configured credentials and return the `Cookie` header value.
    pub async fn session_cookie(&self) -> String {
        let response = self.login(USERNAME, PASSWORD).await;
        assert_eq!(response.status(), 200);
        cookie_pair(&set_cookie(&response).expect("login sets a cookie"))
    }
}

/// The single `Set-Cookie` header of a response, if any.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    let mut values = response.headers().get_all(header::SET_COOKIE).iter();
    let value = values.next()?.to_str().unwrap().to_string();
    assert!(values.next().is_none(), "expected a single Set-Cookie header");
    Some(value)
}

/// `name=value` part of a `Set-Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn json_body(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
