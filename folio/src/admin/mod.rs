//! Admin area.
//!
//! Provides:
//! - Credential check against the single configured admin identity
//! - Stateless signed session tokens (issue, verify, refresh)
//! - The login flow and auth endpoints
//! - The request gate protecting everything under `/admin`
//! - Admin pages and the content API

pub mod api;
pub mod credentials;
pub mod login;
pub mod middleware;
pub mod routes;
pub mod templates;
pub mod token;

pub use credentials::{AdminIdentity, CredentialChecker};
pub use login::{LoginError, LoginFlow, LoginRequest};
pub use middleware::{
    AdminState, DASHBOARD_PATH, GateDecision, LOGIN_PATH, SESSION_COOKIE, evaluate,
    require_admin_session,
};
pub use routes::{admin_router, auth_router};
pub use token::{SessionClaims, TokenError, TokenService};
