/// Errors raised by [`ContentStore`](crate::ContentStore) and
/// [`JobQueue`](crate::JobQueue) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("Duplicate value violates unique constraint: {0}")]
    Duplicate(&'static str),

    /// A foreign key points at a row that does not exist.
    #[error("Referenced {0} does not exist")]
    MissingReference(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;
