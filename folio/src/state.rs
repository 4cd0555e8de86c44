//! Application state shared by every request handler.

use crate::admin::credentials::{AdminIdentity, CredentialChecker};
use crate::admin::login::LoginFlow;
use crate::admin::middleware::AdminState;
use crate::admin::token::TokenService;
use crate::cache::PageCache;
use crate::config::Config;
use crate::content::ContentService;
use crate::db::DbPool;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct AppState {
    pub admin: Arc<AdminState>,
    pub content: ContentService,
    /// Upper bound for CV upload bodies
    pub max_cv_bytes: usize,
}

impl AppState {
    /// Wire up the services from configuration.
    ///
    /// Fails when no signing secret is configured. A missing admin identity
    /// only disables login.
    pub fn from_config(config: &Config, pool: DbPool, data_dir: &Path) -> Result<Self> {
        let tokens = TokenService::from_config(&config.auth)
            .context("Cannot sign admin sessions; set auth.jwt_secret or FOLIO_AUTH__JWT_SECRET")?;

        let checker = CredentialChecker::new(AdminIdentity::from_config(&config.admin));
        if let Some(reason) = checker.configuration_error() {
            warn!(reason, "Admin login is disabled until credentials are configured");
        }

        let admin = AdminState::new(
            LoginFlow::new(checker, tokens),
            config.server.secure_cookies(),
        );

        let ttl = match config.cache.page_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let content = ContentService::new(
            pool,
            Arc::new(PageCache::new(ttl)),
            config.uploads.cv_dir(data_dir),
        );

        Ok(Self {
            admin: Arc::new(admin),
            content,
            max_cv_bytes: config.uploads.max_cv_bytes,
        })
    }
}
