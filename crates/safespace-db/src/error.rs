//! Error types for the persistence boundary.
//!
//! All storage failures are reported as [`DbError`]. Callers only need to
//! tell apart [`DbError::DuplicatePhone`] (a client error). Everything else
//! is an internal fault.

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A user with this phone number already exists.
    #[error("a user with phone {0} already exists")]
    DuplicatePhone(String),

    /// An experience named an author that is not a registered user.
    #[error("no user with id {0}")]
    UnknownUser(safespace_types::UserId),

    /// A stored row could not be mapped back into a domain type.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
