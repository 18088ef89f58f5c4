use std::net::SocketAddr;
use std::sync::Arc;

use sitepulse_ai::{OpenAiClient, OpenAiConfig, TextGenerator};
use sitepulse_cloud::{LocalDiskStore, ObjectStore, S3Store};
use sitepulse_db::{LocalStore, PgStore, RecordStore};
use sitepulse_tracker::Collaborators;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitepulse_api::chat::start_idle_sweep;
use sitepulse_api::config::{ServerConfig, StorageBackend, StoreBackend};
use sitepulse_api::router::build_app_router;
use sitepulse_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "sitepulse_api=debug,sitepulse_tracker=debug,tower_http=debug".into()
    });
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Collaborators ---
    let store = build_store(&config.store).await;
    let storage = build_storage(&config.storage).await;
    let generator: Arc<dyn TextGenerator> = Arc::new(
        OpenAiClient::new(OpenAiConfig {
            api_url: config.ai.api_url.clone(),
            api_key: config.ai.api_key.clone(),
            timeout: config.ai.timeout,
        })
        .expect("Failed to build text generation client"),
    );
    tracing::info!(model = %config.ai.generation.model, "Text generation client ready");

    let collaborators = Collaborators {
        store,
        storage,
        generator,
    };

    // --- App state and router ---
    let state = AppState::new(config.clone(), collaborators);
    let app = build_app_router(state.clone(), &config);

    // --- Background tasks ---
    let sweep_handle = start_idle_sweep(Arc::clone(&state.chats), config.chat_idle_timeout);

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
    sweep_handle.abort();
    let open_sessions = state.chats.len().await;
    tracing::info!(open_sessions, "Server stopped, discarding open chat sessions");
    drop(state);
    tracing::info!("Graceful shutdown complete");
}

async fn build_store(backend: &StoreBackend) -> Arc<dyn RecordStore> {
    match backend {
        StoreBackend::Postgres { database_url } => {
            let pool = sitepulse_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            sitepulse_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            sitepulse_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Local { path } => {
            let store = LocalStore::open(path.clone())
                .await
                .expect("Failed to open local store");
            tracing::warn!(path = %path.display(), "Running in offline mode with a local store");
            Arc::new(store)
        }
    }
}

async fn build_storage(backend: &StorageBackend) -> Arc<dyn ObjectStore> {
    match backend {
        StorageBackend::Local { dir, public_url } => {
            tokio::fs::create_dir_all(dir)
                .await
                .expect("Failed to create storage directory");
            tracing::info!(dir = %dir.display(), %public_url, "Using local file storage");
            Arc::new(LocalDiskStore::new(dir.clone(), public_url.clone()))
        }
        StorageBackend::S3 { bucket, public_url } => {
            tracing::info!(%bucket, "Using S3 storage");
            Arc::new(S3Store::from_env(bucket.clone(), public_url.clone()).await)
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
