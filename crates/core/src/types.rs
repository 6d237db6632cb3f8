/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Export jobs are addressed by an opaque UUID handle.
pub type JobId = uuid::Uuid;
