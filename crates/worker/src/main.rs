use sources_worker::worker::{ThumbnailWorker, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sources_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = WorkerConfig::from_env().expect("Invalid worker configuration");

    let pool = sources_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    sources_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection established");

    let cancel = CancellationToken::new();
    let worker = ThumbnailWorker::new(pool.clone(), config);
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run(cancel).await }
    });

    shutdown_signal().await;
    cancel.cancel();
    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Thumbnail worker task panicked");
    }

    pool.close().await;
    tracing::info!("Worker shut down");
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
