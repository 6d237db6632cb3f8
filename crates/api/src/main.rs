use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use askbox_db::memory::{MemoryContentStore, MemoryJobQueue};
use askbox_db::{ContentStore, JobQueue, PgContentStore, PgJobQueue};
use askbox_search::{ElasticsearchConfig, ElasticsearchIndex, MemoryIndex, SearchIndex};
use askbox_worker::ExportWorker;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askbox_api::background;
use askbox_api::config::{ServerConfig, StoreBackend};
use askbox_api::router::build_app_router;
use askbox_api::state::AppState;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "askbox_api=debug,askbox_worker=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // configuration
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store_backend = ?config.store_backend,
        "Loaded server configuration",
    );

    // content store and job queue
    let mut pool = None;
    let (store, jobs): (Arc<dyn ContentStore>, Arc<dyn JobQueue>) = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

            let db = askbox_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            askbox_db::health_check(&db)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            askbox_db::run_migrations(&db)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            pool = Some(db.clone());
            (
                Arc::new(PgContentStore::new(db.clone())),
                Arc::new(PgJobQueue::new(db)),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; all data is lost on restart");
            (
                Arc::new(MemoryContentStore::new()),
                Arc::new(MemoryJobQueue::new()),
            )
        }
    };

    // search index
    let search: Arc<dyn SearchIndex> = match &config.search.url {
        Some(url) => {
            let index = ElasticsearchIndex::new(ElasticsearchConfig {
                url: url.clone(),
                index: config.search.index.clone(),
                timeout: config.search.timeout,
            })
            .expect("Failed to build search client");
            tracing::info!(url = %url, index = %config.search.index, "Using Elasticsearch index");
            Arc::new(index)
        }
        None => {
            tracing::info!("SEARCH_URL not set, using in-process search index");
            Arc::new(MemoryIndex::new())
        }
    };

    // background tasks
    let cancel = CancellationToken::new();
    let mut handles: Vec<(&'static str, JoinHandle<()>)> = Vec::new();

    if let Some(interval) = config.search.reconcile_interval {
        handles.push((
            "search reconciliation",
            tokio::spawn(background::search_reconcile::run(
                Arc::clone(&store),
                Arc::clone(&search),
                interval,
                cancel.clone(),
            )),
        ));
    }

    handles.push((
        "export retention",
        tokio::spawn(background::export_retention::run(
            Arc::clone(&jobs),
            config.export_retention_hours,
            cancel.clone(),
        )),
    ));

    if config.embedded_worker {
        let worker =
            ExportWorker::new(Arc::clone(&store), Arc::clone(&jobs), config.export.clone());
        let worker_cancel = cancel.clone();
        handles.push((
            "export worker",
            tokio::spawn(async move { worker.run(worker_cancel).await }),
        ));
    }

    tracing::info!(count = handles.len(), "Background tasks started");

    // app state
    let state = AppState {
        store,
        search,
        jobs,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // start server
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

    // post-shutdown cleanup
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    for (name, handle) in handles {
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!(task = name, "Background task did not stop in time");
        } else {
            tracing::info!(task = name, "Background task stopped");
        }
    }

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
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
