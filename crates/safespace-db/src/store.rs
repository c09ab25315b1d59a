//! Storage backend selected at startup.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible. Both backends honor the same contract: unique
//! phone numbers, experience authors must be registered users, and
//! experiences are listed newest-first.

use safespace_types::{Experience, UserId};

use crate::error::DbError;
use crate::experience_store::ExperienceStore;
use crate::memory::MemoryStore;
use crate::postgres::PostgresPool;
use crate::records::{NewExperience, NewUser, StoredUser};
use crate::user_store::UserStore;

/// A persistence backend for users and experiences.
#[derive(Debug, Clone)]
pub enum Store {
    /// Durable `PostgreSQL` storage.
    Postgres(PostgresPool),
    /// Process-local storage for development and tests.
    Memory(MemoryStore),
}

impl Store {
    /// Create an empty in-memory store.
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuplicatePhone`] if the phone number is taken, or
    /// a backend error.
    pub async fn create_user(&self, new: &NewUser) -> Result<StoredUser, DbError> {
        match self {
            Self::Postgres(pg) => UserStore::new(pg.pool()).insert(new).await,
            Self::Memory(mem) => mem.insert_user(new).await,
        }
    }

    /// Look up a user by phone number.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the lookup fails.
    pub async fn find_user_by_phone(&self, phone: &str) -> Result<Option<StoredUser>, DbError> {
        match self {
            Self::Postgres(pg) => UserStore::new(pg.pool()).find_by_phone(phone).await,
            Self::Memory(mem) => Ok(mem.find_user_by_phone(phone).await),
        }
    }

    /// Look up a user by ID.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the lookup fails.
    pub async fn find_user_by_id(&self, id: UserId) -> Result<Option<StoredUser>, DbError> {
        match self {
            Self::Postgres(pg) => UserStore::new(pg.pool()).find_by_id(id).await,
            Self::Memory(mem) => Ok(mem.find_user_by_id(id).await),
        }
    }

    /// Store a new experience.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownUser`] if the author is not a registered
    /// user, or a backend error if the insert fails.
    pub async fn create_experience(&self, new: &NewExperience) -> Result<Experience, DbError> {
        match self {
            Self::Postgres(pg) => ExperienceStore::new(pg.pool()).insert(new).await,
            Self::Memory(mem) => mem.insert_experience(new).await,
        }
    }

    /// All experiences, newest first.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the query fails.
    pub async fn list_experiences(&self) -> Result<Vec<Experience>, DbError> {
        match self {
            Self::Postgres(pg) => ExperienceStore::new(pg.pool()).list_newest_first().await,
            Self::Memory(mem) => Ok(mem.list_experiences().await),
        }
    }

    /// Human-readable backend name for logging.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Self::Postgres(pg) = self {
            pg.close().await;
        }
    }
}
