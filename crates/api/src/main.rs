use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use swing_api::auth::identity::GoogleTokenVerifier;
use swing_api::background::competition_lifecycle;
use swing_api::config::ServerConfig;
use swing_api::router::build_app_router;
use swing_api::state::AppState;
use swing_db::Store;
use swing_events::{EventBus, NotificationWriter};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swing_api=debug,swing_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let store = match &config.database_url {
        Some(database_url) => {
            let pool = swing_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            swing_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            swing_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Store::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            Store::in_memory()
        }
    };

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let writer_handle =
        tokio::spawn(NotificationWriter::new(store.clone()).run(event_bus.subscribe()));

    // --- Background jobs ---
    let lifecycle_cancel = CancellationToken::new();
    let lifecycle_handle = tokio::spawn(competition_lifecycle::run(
        store.clone(),
        Duration::from_secs(config.competition_sweep_secs.max(1)),
        lifecycle_cancel.clone(),
    ));
    tracing::info!("Background services started (notification writer, competition lifecycle)");

    // --- App state ---
    let identity = Arc::new(GoogleTokenVerifier::new(config.google_client_id.clone()));
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        identity,
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    lifecycle_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), lifecycle_handle).await;

    // Dropping the last sender closes the channel and stops the writer.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), writer_handle).await;
    tracing::info!("Background services shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
