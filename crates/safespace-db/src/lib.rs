//! Persistence boundary for the SafeSpace backend.
//!
//! Users and experience stories are the only durable entities. They live
//! in `PostgreSQL` in production and in a process-local [`MemoryStore`]
//! during development and tests. The API talks to whichever backend was
//! selected at startup through the [`Store`] enum.
//!
//! ```text
//! Store::Postgres(PostgresPool)
//!     |-- UserStore        (users, unique phone)
//!     +-- ExperienceStore  (experiences, newest-first)
//! Store::Memory(MemoryStore)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool, configuration, migrations
//! - [`user_store`] -- user inserts and lookups
//! - [`experience_store`] -- experience inserts and listing
//! - [`memory`] -- in-memory backend
//! - [`store`] -- backend selection via enum dispatch
//! - [`records`] -- insert payloads and stored shapes
//! - [`error`] -- shared error type

pub mod error;
pub mod experience_store;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;
pub mod user_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use experience_store::{ExperienceRow, ExperienceStore};
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool, redacted_url};
pub use records::{NewExperience, NewUser, StoredUser};
pub use store::Store;
pub use user_store::{UserRow, UserStore};
