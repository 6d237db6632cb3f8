//! Persistence for askbox: users, questions, answers and export jobs.
//!
//! - [`repositories`] -- zero-sized repository structs over a [`DbPool`].
//! - [`store`] / [`queue`] -- the [`ContentStore`] and [`JobQueue`] seams the
//!   HTTP layer and the export worker program against.
//! - [`memory`] -- in-process implementations of both seams for the
//!   single-process development mode and for tests.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod queue;
pub mod repositories;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use queue::{JobQueue, PgJobQueue};
pub use store::{ContentStore, PgContentStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
