//! Database pool for the document store.
//!
//! The backend is picked at compile time: `sqlite` (default) keeps everything
//! in one file under the data directory, `postgres` connects to a server.
//! Either way the embedded `documents` migration runs before the pool is
//! handed out.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

#[cfg(feature = "sqlite")]
pub use sqlx::{SqlitePool as DbPool, sqlite::SqliteRow as DbRow};

#[cfg(feature = "postgres")]
pub use sqlx::{PgPool as DbPool, postgres::PgRow as DbRow};

/// File name of the SQLite database inside the data directory.
#[cfg(feature = "sqlite")]
pub const SQLITE_FILE: &str = "folio.db";

pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Connect, run migrations and return the ready pool.
    pub async fn new(config: &DatabaseConfig, data_dir: &Path) -> Result<Self> {
        let pool = connect(config, data_dir).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run document store migrations")?;
        debug!("Document store schema is up to date");

        Ok(Self { pool })
    }

    /// Pool handle for the content collections. Cheap to clone.
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

#[cfg(feature = "sqlite")]
async fn connect(config: &DatabaseConfig, data_dir: &Path) -> Result<DbPool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    let db_path = config.sqlite_path(data_dir);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database {}", db_path.display()))?;

    info!(backend = "sqlite", path = %db_path.display(), "Database connected");
    Ok(pool)
}

#[cfg(feature = "postgres")]
async fn connect(config: &DatabaseConfig, _data_dir: &Path) -> Result<DbPool> {
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to PostgreSQL at {}:{}/{}",
                config.host, config.port, config.database
            )
        })?;

    info!(
        backend = "postgres",
        host = %config.host,
        port = config.port,
        database = %config.database,
        "Database connected"
    );
    Ok(pool)
}
