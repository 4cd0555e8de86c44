//! Portfolio server - Main entry point
//!
//! Serves the public portfolio pages and the admin area that edits them.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use folio::admin::{AdminIdentity, CredentialChecker, TokenService};
use folio::config::{self, Config};
use folio::db::Database;
use folio::server::{ServerConfig, run_server};
use folio::state::AppState;

/// Portfolio server with a token-gated admin area
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value_os_t = Config::default_path())]
    config: PathBuf,

    /// Data directory for the database, uploads and logs
    #[arg(short, long, default_value_os_t = Config::default_data_dir())]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Generate a default configuration file
    InitConfig {
        /// Output path (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report whether the admin login and session signing are configured
    CheckConfig,
}

impl Cli {
    /// `RUST_LOG` wins; `-v` raises the default level to debug.
    fn log_filter(&self) -> EnvFilter {
        let level = if self.verbose { Level::DEBUG } else { Level::INFO };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = cli.log_filter();

    match cli.command {
        Commands::Serve { listen } => {
            init_logging(filter, Some(&cli.data_dir.join("logs")))?;
            serve(&cli.config, &cli.data_dir, listen).await
        }
        Commands::InitConfig { output } => {
            init_logging(filter, None)?;
            generate_config(output)
        }
        Commands::CheckConfig => {
            init_logging(filter, None)?;
            check_config(&cli.config)
        }
    }
}

/// Install the global subscriber: stdout always, plus a daily-rotated
/// `folio.<date>.log` in `log_dir` for the server.
fn init_logging(filter: EnvFilter, log_dir: Option<&Path>) -> Result<()> {
    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("folio")
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create log file appender")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // Flushing stops when the guard drops; the server runs until exit
            std::mem::forget(guard);
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        info!(dir = %dir.display(), "Writing logs to file");
    }
    Ok(())
}

/// Run the web server
async fn serve(config_path: &Path, data_dir: &Path, listen_override: Option<SocketAddr>) -> Result<()> {
    ensure_data_dir(data_dir)?;

    let config = Config::load(config_path)?;

    let listen_addr: SocketAddr = match listen_override {
        Some(addr) => addr,
        None => config.server.listen_addr.parse().with_context(|| {
            format!("Invalid listen address in config: {}", config.server.listen_addr)
        })?,
    };

    let db = Database::new(&config.database, data_dir).await?;
    let state = Arc::new(AppState::from_config(&config, db.pool(), data_dir)?);

    info!(
        environment = ?config.server.environment,
        secure_cookies = config.server.secure_cookies(),
        "Portfolio server starting..."
    );

    run_server(ServerConfig { listen_addr }, state).await
}

/// Ensure data directory exists
fn ensure_data_dir(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        info!("Created data directory: {}", data_dir.display());
    }
    Ok(())
}

/// Print which auth settings are present; fail if any is missing.
fn check_config(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let mut problems = 0;

    let checker = CredentialChecker::new(AdminIdentity::from_config(&config.admin));
    match checker.configuration_error() {
        None => println!("admin identity:  ok"),
        Some(reason) => {
            println!("admin identity:  {reason}");
            problems += 1;
        }
    }

    match TokenService::from_config(&config.auth) {
        Ok(_) => println!("session signing: ok ({}h sessions)", config.auth.session_ttl_hours),
        Err(e) => {
            println!("session signing: {e}");
            problems += 1;
        }
    }

    println!("environment:     {:?}", config.server.environment);

    if problems > 0 {
        bail!("{problems} configuration problem(s) found");
    }
    Ok(())
}

/// Generate a default configuration file
fn generate_config(output: Option<PathBuf>) -> Result<()> {
    let config = config::default_config_template();

    match output {
        Some(path) => {
            std::fs::write(&path, &config)?;
            println!("Configuration written to: {}", path.display());
        }
        None => {
            print!("{}", config);
        }
    }

    Ok(())
}
