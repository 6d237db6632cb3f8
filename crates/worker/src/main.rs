use std::sync::Arc;

use askbox_db::{PgContentStore, PgJobQueue};
use askbox_worker::{ExportConfig, ExportWorker};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askbox_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = askbox_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    askbox_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection established");

    let worker = ExportWorker::new(
        Arc::new(PgContentStore::new(pool.clone())),
        Arc::new(PgJobQueue::new(pool.clone())),
        ExportConfig::from_env(),
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        signal_cancel.cancel();
    });

    worker.run(cancel).await;

    pool.close().await;
    tracing::info!("Worker shutdown complete");
}
