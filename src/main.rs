use std::sync::Arc;

use anyhow::Context;
use supportline::config::ServerConfig;
use supportline::realtime::NotificationHub;
use supportline::routes::app_router;
use supportline::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;

    eprintln!("📨 Supportline v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);
    eprintln!("   WS:  ws://0.0.0.0:{}/ws/messages", config.port);
    eprintln!("   Database: {}", config.db_path.display());

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| {
                format!("failed to open database at {}", config.db_path.display())
            })?,
    );

    let hub = NotificationHub::new();

    let app = app_router(db, hub);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Supportline server started");
    axum::serve(listener, app).await?;

    Ok(())
}
