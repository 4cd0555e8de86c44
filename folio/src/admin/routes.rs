//! Admin route handlers.
//!
//! Auth endpoints (`/api/auth/*`) plus the two HTML pages (login and
//! dashboard). The content API lives in [`crate::admin::api`].

use crate::admin::api;
use crate::admin::login::{LoginError, LoginRequest};
use crate::admin::middleware::{DASHBOARD_PATH, SESSION_COOKIE};
use crate::admin::templates::{
    BaseContext, CvSummary, DashboardTemplate, LoginTemplate, MessageSummary,
};
use crate::admin::token::SessionClaims;
use crate::content::MessageFilter;
use crate::error::{ApiError, ApiResponse};
use crate::state::AppState;
use askama::Template;
use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const DASHBOARD_RECENT_MESSAGES: usize = 5;

const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please sign in again.";

/// Routes mounted under `/api/auth`.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
}

/// Routes mounted under `/admin`. Everything except `/login` sits behind
/// the session gate.
pub fn admin_router(max_cv_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page))
        .route("/dashboard", get(dashboard))
        .nest("/api", api::content_api_router(max_cv_bytes))
}

/// Session lifetime details returned to clients.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub username: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&SessionClaims> for SessionInfo {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            username: claims.sub.clone(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        }
    }
}

/// Login API handler. Sets the session cookie on success.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<serde_json::Value>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Malformed login request");
        LoginError::InvalidInput
    })?;

    let token = state.admin.login.login(&request)?;

    Ok((
        jar.add(state.admin.session_cookie(token)),
        ApiResponse::ok(json!({ "success": true })).with_message("Login successful"),
    ))
}

/// Logout API handler. Always succeeds, with or without a session.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if jar.get(SESSION_COOKIE).is_some() {
        info!("Admin logged out");
    }

    (
        jar.add(state.admin.removal_cookie()),
        ApiResponse::ok(json!({ "success": true })).with_message("Logged out"),
    )
}

/// Re-issue the session cookie with a fresh expiry.
async fn refresh(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return ApiError::Unauthorized("No active session.".to_string()).into_response();
    };

    let tokens = state.admin.tokens();
    let refreshed = tokens
        .refresh(&token)
        .and_then(|fresh| tokens.verify(&fresh).map(|claims| (fresh, claims)));

    match refreshed {
        Ok((fresh, claims)) => (
            jar.add(state.admin.session_cookie(fresh)),
            ApiResponse::ok(SessionInfo::from(&claims)),
        )
            .into_response(),
        Err(e) => {
            info!(error = %e, "Session refresh rejected");
            (
                jar.add(state.admin.removal_cookie()),
                ApiError::Unauthorized("Session expired or invalid.".to_string()),
            )
                .into_response()
        }
    }
}

fn render<T: Template>(template: T) -> Response {
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {e}")),
    )
    .into_response()
}

/// Login page handler. The gate lets this through without a session.
async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return render(LoginTemplate { error: None });
    };

    if state.admin.tokens().verify(cookie.value()).is_ok() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    // Stale session: say so and drop the cookie
    (
        jar.add(state.admin.removal_cookie()),
        render(LoginTemplate {
            error: Some(SESSION_EXPIRED_NOTICE.to_string()),
        }),
    )
        .into_response()
}

fn display_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Dashboard handler.
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Response, ApiError> {
    let content = &state.content;

    let recent_messages = content
        .list_messages(&MessageFilter {
            email: None,
            limit: Some(DASHBOARD_RECENT_MESSAGES),
        })
        .await?
        .into_iter()
        .map(|m| MessageSummary {
            name: m.data.name,
            email: m.data.email,
            submitted_at: display_time(m.data.submitted_at),
        })
        .collect();

    let cv = content.current_cv().await?.map(|cv| CvSummary {
        original_name: cv.data.original_name,
        uploaded_at: display_time(cv.data.uploaded_at),
        file_size_kb: cv.data.file_size.div_ceil(1024),
    });

    let template = DashboardTemplate {
        base: BaseContext {
            username: claims.sub.clone(),
        },
        session_expires_at: claims
            .expires_at()
            .map(display_time)
            .unwrap_or_default(),
        skill_count: content.count_skills().await?,
        experience_count: content.count_experience().await?,
        message_count: content.count_messages().await?,
        has_about: content.get_about().await?.is_some(),
        cv,
        recent_messages,
    };

    Ok(render(template))
}
