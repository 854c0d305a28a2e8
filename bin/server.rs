// Signal Catalog - Web Server
// REST API with Axum over the seeded SQLite catalogs

use anyhow::{Context, Result};
use rusqlite::Connection;
use signal_catalog::api::{router, AppState};
use signal_catalog::{load_snapshot, seed_if_empty, setup_database, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,signal_catalog=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🌐 Signal Catalog - Web Server");

    let config = Config::from_env().context("Failed to load configuration")?;

    // Open database and load the catalogs once; they are immutable afterwards
    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;
    setup_database(&conn)?;
    let report = seed_if_empty(&conn)?;
    tracing::info!(?report, db = ?config.database_path, "database ready");

    let snapshot = load_snapshot(&conn)?;
    drop(conn);

    let app = router(AppState::from_snapshot(snapshot));

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("🚀 Server running on http://{}", addr);
    tracing::info!("   API: http://{}/api/providers", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
