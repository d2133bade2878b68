//! Error types for the guardian store.

/// Errors that can occur in the guardian store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The username was empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// A flower count does not fit the `flower_count` column.
    #[error("flower count {0} is out of range")]
    CountOutOfRange(u32),
}
