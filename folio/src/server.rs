//! HTTP server.
//!
//! One axum router serves the public site, the auth API and the admin area.
//! The admin session gate wraps the whole router (fallback included), so
//! unknown `/admin/...` paths redirect to the login page instead of 404ing.

use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    response::{IntoResponse, Redirect},
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::admin::{self, DASHBOARD_PATH};
use crate::error::ApiError;
use crate::site;
use crate::state::AppState;

/// Configuration for the HTTP server
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

/// Build the combined HTTP router.
pub fn http_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(site::site_router())
        .nest("/api/auth", admin::auth_router())
        // Handle both /admin and /admin/ by redirecting to dashboard
        .route("/admin", get(|| async { Redirect::to(DASHBOARD_PATH) }))
        .route("/admin/", get(|| async { Redirect::to(DASHBOARD_PATH) }))
        .nest("/admin", admin::admin_router(state.max_cv_bytes))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.admin.clone(),
            admin::require_admin_session,
        ))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    ApiError::NotFound("Not found".to_string())
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn run_server(config: ServerConfig, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    info!(addr = %config.listen_addr, "Starting HTTP server");

    axum::serve(listener, http_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
