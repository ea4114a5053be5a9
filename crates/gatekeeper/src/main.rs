//! Gatekeeper - request authorization service backed by a snapshot object store

use anyhow::{Result, bail};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig, StorageConfig};
use gatekeeper_api::{AppState, create_router};
use gatekeeper_auth::{Accounts, AuthType, Authenticator, PathPolicy, spawn_session_sweeper};
use gatekeeper_db::{Database, SystemClock};
use gatekeeper_storage::{LocalSnapshots, MemorySnapshots, SnapshotBackend, SqliteSnapshots};

/// Gatekeeper - authorization gatekeeper for a web API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "GATEKEEPER_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "GATEKEEPER_PORT")]
    port: Option<u16>,

    /// Authentication strategy (auth, basic_auth, session_auth, session_exp_auth)
    #[arg(long, env = "AUTH_TYPE")]
    auth_type: Option<AuthType>,

    /// Session cookie name
    #[arg(long, env = "SESSION_NAME")]
    session_name: Option<String>,

    /// Session lifetime in seconds
    #[arg(long, env = "SESSION_DURATION")]
    session_duration: Option<String>,
}

impl Args {
    /// Command line and environment take precedence over the file
    fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(auth_type) = self.auth_type {
            config.auth.auth_type = auth_type;
        }
        if let Some(name) = &self.session_name {
            config.auth.session_name = name.clone();
        }
        if let Some(duration) = &self.session_duration {
            config.auth.session_duration = Some(toml::Value::String(duration.clone()));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Gatekeeper v{}", env!("CARGO_PKG_VERSION"));

    // Open the object store
    let backend = open_backend(&config.storage).await?;
    let db = Database::open(backend, Arc::new(SystemClock)).await?;

    // Compose authentication
    let hasher = config.auth.hasher.hasher();
    let paths = PathPolicy::new(config.auth.excluded_paths.clone())
        .with_unconfigured(config.auth.unconfigured_policy());
    let authenticator = Arc::new(Authenticator::from_type(
        config.auth.auth_type,
        &db,
        hasher.clone(),
        paths,
        config.auth.session_name.clone(),
        config.auth.session_expiry(),
    ));
    let accounts = Arc::new(Accounts::new(db.users().clone(), hasher));

    info!(
        "Authentication: {} (enabled: {}, hasher: {})",
        config.auth.auth_type,
        config.auth.enabled,
        config.auth.hasher.as_str()
    );
    if !config.auth.enabled {
        warn!("Authentication is disabled; every route is open");
    }

    // Start background session cleanup
    if config.auth.auth_type == AuthType::SessionExpAuth && config.auth.sweep_interval_secs > 0 {
        spawn_session_sweeper(
            authenticator.sessions().clone(),
            config.auth.sweep_interval_secs,
        );
    }

    // Create router
    let state = AppState::new(db, authenticator, accounts, config.auth.enabled);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Build the snapshot backend named in the configuration
async fn open_backend(storage: &StorageConfig) -> Result<Arc<dyn SnapshotBackend>> {
    let backend: Arc<dyn SnapshotBackend> = match storage.backend.as_str() {
        "file" => Arc::new(LocalSnapshots::new(&storage.path).await?),
        "sqlite" => {
            if let Some(parent) = std::path::Path::new(&storage.database).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let url = format!("sqlite:{}?mode=rwc", storage.database);
            Arc::new(SqliteSnapshots::new(&url).await?)
        }
        "memory" => {
            warn!("Using in-memory snapshots; nothing will be persisted");
            Arc::new(MemorySnapshots::new())
        }
        other => bail!("Unknown storage backend: {}", other),
    };
    Ok(backend)
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
