//! Admin state, session cookie handling and the request gate.
//!
//! The gate runs in front of routing for every request. Anything under
//! `/admin` other than the login page needs a valid session cookie; the
//! decision itself is the pure [`evaluate`] so it can be tested without a
//! server.

use crate::admin::login::LoginFlow;
use crate::admin::token::{SessionClaims, TokenService};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "admin_token";

/// Admin login page, reachable without a session
pub const LOGIN_PATH: &str = "/admin/login";

/// Where logged-in visitors of the admin root and login page land
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Path prefix guarded by the gate
pub const ADMIN_PREFIX: &str = "/admin";

/// State shared by the admin routes and the gate
pub struct AdminState {
    pub login: LoginFlow,
    /// Mark the session cookie `Secure` (production)
    pub secure_cookies: bool,
}

impl AdminState {
    pub fn new(login: LoginFlow, secure_cookies: bool) -> Self {
        Self {
            login,
            secure_cookies,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        self.login.tokens()
    }

    /// Cookie carrying a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(self.tokens().ttl().num_seconds()))
            .build()
    }

    /// Already-expired cookie that makes the browser drop the session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .build();
        cookie.make_removal();
        cookie
    }
}

/// Whether a path is guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Outside the admin prefix
    Public,
    /// The admin login page
    Login,
    /// Anything else under the admin prefix
    Protected,
}

pub fn classify_path(path: &str) -> PathClass {
    if path == LOGIN_PATH {
        return PathClass::Login;
    }

    match path.strip_prefix(ADMIN_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => PathClass::Protected,
        _ => PathClass::Public,
    }
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Not guarded; pass through untouched
    Pass,
    /// Guarded and the session is valid
    Authenticated(SessionClaims),
    /// Guarded and no valid session; `clear_cookie` when a bad token was sent
    RedirectToLogin { clear_cookie: bool },
}

/// Decide what to do with a request for `path` carrying `token`.
pub fn evaluate(
    path: &str,
    token: Option<&str>,
    tokens: &TokenService,
    now: DateTime<Utc>,
) -> GateDecision {
    match classify_path(path) {
        PathClass::Public | PathClass::Login => GateDecision::Pass,
        PathClass::Protected => match token {
            None => GateDecision::RedirectToLogin {
                clear_cookie: false,
            },
            Some(token) => match tokens.verify_at(token, now) {
                Ok(claims) => GateDecision::Authenticated(claims),
                Err(e) => {
                    debug!(path, error = %e, "Rejected admin session");
                    GateDecision::RedirectToLogin { clear_cookie: true }
                }
            },
        },
    }
}

/// Gate middleware. Valid sessions get their [`SessionClaims`] attached as a
/// request extension.
pub async fn require_admin_session(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let decision = evaluate(
        request.uri().path(),
        token.as_deref(),
        state.tokens(),
        Utc::now(),
    );

    match decision {
        GateDecision::Pass => next.run(request).await,
        GateDecision::Authenticated(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        GateDecision::RedirectToLogin { clear_cookie: false } => {
            Redirect::to(LOGIN_PATH).into_response()
        }
        GateDecision::RedirectToLogin { clear_cookie: true } => (
            jar.add(state.removal_cookie()),
            Redirect::to(LOGIN_PATH),
        )
            .into_response(),
    }
}
