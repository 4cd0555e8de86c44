//! Configuration loading for the portfolio server.
//!
//! Loads configuration from TOML files and/or environment variables using figment.
//! Every section has defaults, so the server can run from environment variables
//! alone (container-friendly) or from a config file with env overrides.
//!
//! # Configuration Sources (in order of priority, lowest to highest)
//!
//! 1. Default values (from `#[serde(default)]` attributes)
//! 2. TOML config file (if provided)
//! 3. Environment variables (prefix: `FOLIO_`, nested with `__`)
//!
//! # Environment Variable Naming
//!
//! - `FOLIO_SERVER__LISTEN_ADDR` → `server.listen_addr`
//! - `FOLIO_SERVER__ENVIRONMENT` → `server.environment`
//! - `FOLIO_ADMIN__USERNAME` → `admin.username`
//! - `FOLIO_ADMIN__PASSWORD` → `admin.password`
//! - `FOLIO_AUTH__JWT_SECRET` → `auth.jwt_secret`
//! - `FOLIO_DATABASE__PATH` → `database.path`
//!
//! # Admin Credentials
//!
//! The admin identity is a single username/password pair read from here and
//! nowhere else. Leaving either value unset is not a startup error: the site
//! still serves public pages and the login endpoint reports the service as
//! unavailable. The signing secret, on the other hand, is required to start.

use anyhow::{Context, Result};
use chrono::Duration;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Deployment environment. Controls cookie hardening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Local development: session cookies are sent over plain HTTP.
    #[default]
    Development,

    /// Production: session cookies carry the `Secure` attribute.
    Production,
}

/// Main configuration for the portfolio server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Admin account (single static identity)
    #[serde(default)]
    pub admin: AdminConfig,

    /// Session token settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Rendered page cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Uploaded file storage
    #[serde(default)]
    pub uploads: UploadConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            environment: Environment::default(),
        }
    }
}

impl ServerConfig {
    /// Whether session cookies should be marked `Secure`.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

/// Admin account configuration.
///
/// Both values are optional so that a missing value is a detectable state
/// rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Admin username
    #[serde(default)]
    pub username: Option<String>,

    /// Admin password (compared as plain text)
    #[serde(default)]
    pub password: Option<String>,
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens. Required for `serve`.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Session lifetime in hours (default: 24)
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

impl AuthConfig {
    /// Session lifetime as a duration.
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.session_ttl_hours))
    }
}

fn default_session_ttl_hours() -> u32 {
    24
}

/// Page cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum age of a cached page in seconds. 0 keeps pages until a
    /// content change invalidates them.
    #[serde(default = "default_page_ttl_secs")]
    pub page_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_ttl_secs: default_page_ttl_secs(),
        }
    }
}

fn default_page_ttl_secs() -> u64 {
    300
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Directory for uploaded CV files.
    /// If not specified, defaults to `uploads/cv` in the data directory.
    #[serde(default)]
    pub cv_dir: Option<PathBuf>,

    /// Maximum accepted CV upload size in bytes (default: 10 MiB)
    #[serde(default = "default_max_cv_bytes")]
    pub max_cv_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            cv_dir: None,
            max_cv_bytes: default_max_cv_bytes(),
        }
    }
}

impl UploadConfig {
    /// Resolve the CV directory against the data directory.
    pub fn cv_dir(&self, data_dir: &Path) -> PathBuf {
        self.cv_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("uploads").join("cv"))
    }
}

fn default_max_cv_bytes() -> usize {
    10 * 1024 * 1024
}

// =============================================================================
// Database Configuration (compile-time feature selection)
// =============================================================================

/// SQLite database configuration (used when compiled with `sqlite` feature).
#[cfg(feature = "sqlite")]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    /// If not specified, defaults to `folio.db` in the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pool size (default: 5)
    #[serde(default = "default_sqlite_max_connections")]
    pub max_connections: u32,
}

#[cfg(feature = "sqlite")]
fn default_sqlite_max_connections() -> u32 {
    5
}

#[cfg(feature = "sqlite")]
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_sqlite_max_connections(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl DatabaseConfig {
    /// Resolve the database file against the data directory.
    pub fn sqlite_path(&self, data_dir: &Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir.join(crate::db::SQLITE_FILE))
    }
}

/// PostgreSQL database configuration (used when compiled with `postgres` feature).
#[cfg(feature = "postgres")]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database host (default: "localhost")
    #[serde(default = "default_postgres_host")]
    pub host: String,

    /// Database port (default: 5432)
    #[serde(default = "default_postgres_port")]
    pub port: u16,

    /// Database user
    #[serde(default)]
    pub user: String,

    /// Database password
    #[serde(default)]
    pub password: String,

    /// Database name (default: "portfolio")
    #[serde(default = "default_postgres_database")]
    pub database: String,

    /// Pool size (default: 10)
    #[serde(default = "default_postgres_max_connections")]
    pub max_connections: u32,
}

#[cfg(feature = "postgres")]
fn default_postgres_max_connections() -> u32 {
    10
}

#[cfg(feature = "postgres")]
fn default_postgres_host() -> String {
    "localhost".to_string()
}

#[cfg(feature = "postgres")]
fn default_postgres_port() -> u16 {
    5432
}

#[cfg(feature = "postgres")]
fn default_postgres_database() -> String {
    "portfolio".to_string()
}

#[cfg(feature = "postgres")]
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_postgres_host(),
            port: default_postgres_port(),
            user: String::new(),
            password: String::new(),
            database: default_postgres_database(),
            max_connections: default_postgres_max_connections(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Configuration sources are merged in order (later sources override earlier):
    /// 1. TOML config file (if it exists)
    /// 2. Environment variables (prefix: `FOLIO_`, nested with `__`)
    ///
    /// # Example
    ///
    /// ```bash
    /// export FOLIO_ADMIN__USERNAME=admin
    /// export FOLIO_ADMIN__PASSWORD=hunter2
    /// export FOLIO_AUTH__JWT_SECRET=$(openssl rand -hex 32)
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let mut figment = Figment::new();

        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("FOLIO_").split("__"));

        let config: Config = figment.extract().with_context(|| {
            format!(
                "Failed to load config from {} and environment",
                path.display()
            )
        })?;

        Ok(config)
    }

    /// Get the default config file path
    /// - macOS: ~/Library/Application Support/folio/config.toml
    /// - Linux: ~/.config/folio/config.toml
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
            .join("config.toml")
    }

    /// Get the default data directory (database, uploads, logs)
    /// - macOS: ~/Library/Application Support/folio/
    /// - Linux: ~/.local/share/folio/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
    }
}

/// Create a default configuration template
pub fn default_config_template() -> String {
    let data_dir = Config::default_data_dir();
    let data_dir_str = data_dir.display();

    format!(
        r#"# Folio Portfolio Server Configuration
# Data directory: {data_dir_str}

[server]
listen_addr = "0.0.0.0:3000"
# "production" marks the admin session cookie as Secure
environment = "development"

# =============================================================================
# Admin Account
# =============================================================================
#
# A single static account. Both values must be set for the login to work;
# prefer FOLIO_ADMIN__USERNAME / FOLIO_ADMIN__PASSWORD over storing them here.

[admin]
# username = "admin"
# password = "change-me"

[auth]
# Required. Signs the admin session token (HS256).
# jwt_secret = "generate-with-openssl-rand-hex-32"
session_ttl_hours = 24

[cache]
# Seconds a rendered public page is reused. 0 = until content changes.
page_ttl_secs = 300

[uploads]
# cv_dir = "{data_dir_str}/uploads/cv"
max_cv_bytes = 10485760

# =============================================================================
# Database Configuration
# =============================================================================
#
# The backend is selected at compile time via cargo features:
#   - cargo build -p folio (sqlite, default)
#   - cargo build -p folio --features postgres --no-default-features

# SQLite configuration
[database]
# path = "{data_dir_str}/folio.db"  # Optional, defaults to data_dir/folio.db
# max_connections = 5

# PostgreSQL configuration
# [database]
# host = "localhost"
# port = 5432
# user = "folio"
# password = "secret"
# database = "portfolio"
"#
    )
}
