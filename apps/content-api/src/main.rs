//! # Content API Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (api.toml, then LINGUA_* environment)
//! 3. Connect to database & run migrations
//! 4. Bind the listener and serve until Ctrl+C

use content_api::config::ApiConfig;
use content_api::{build_router, AppState};
use lingua_db::Database;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ApiConfig::load(None)?;

    let db_config = config.db_config();
    if let Some(parent) = db_config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    info!(path = %db_config.database_path.display(), "Database path determined");

    let db = Database::new(db_config).await?;
    let (total, applied) = db.migration_status().await?;
    info!(total, applied, "Database connected and migrations applied");

    let app = build_router(AppState::new(db.clone()));

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Content API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Content API shutting down");
        })
        .await?;

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=lingua_db=trace` - Show every reconcile step
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lingua_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
