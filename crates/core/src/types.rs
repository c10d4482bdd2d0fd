/// Prefix primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Event code primary keys are UUIDs generated by the database.
pub type CodeId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
