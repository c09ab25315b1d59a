//! Operations on the `users` table.

use chrono::{DateTime, Utc};
use safespace_types::{EmergencyContact, User, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::records::{NewUser, StoredUser};

/// Column list shared by every `SELECT` on `users`.
const USER_COLUMNS: &str = "id, name, phone, age, password_hash, emergency_contact_name, \
     emergency_contact_phone, emergency_contact_relation, created_at";

/// Operations on the `users` table.
pub struct UserStore<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStore<'a> {
    /// Create a new user store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuplicatePhone`] if the phone number is taken,
    /// or [`DbError::Postgres`] for any other failure.
    pub async fn insert(&self, new: &NewUser) -> Result<StoredUser, DbError> {
        let id = UserId::new();
        let created_at = Utc::now();

        let result = sqlx::query(
            r"INSERT INTO users
              (id, name, phone, age, password_hash, emergency_contact_name, emergency_contact_phone, emergency_contact_relation, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(id.into_inner())
        .bind(&new.name)
        .bind(&new.phone)
        .bind(i32::from(new.age))
        .bind(&new.password_hash)
        .bind(&new.emergency_contact.name)
        .bind(&new.emergency_contact.phone)
        .bind(&new.emergency_contact.relation)
        .bind(created_at)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DbError::DuplicatePhone(new.phone.clone()));
            }
            Err(e) => return Err(DbError::Postgres(e)),
        }

        tracing::debug!(user_id = %id, "Inserted user");

        Ok(StoredUser {
            user: User {
                id,
                name: new.name.clone(),
                phone: new.phone.clone(),
                age: new.age,
                emergency_contact: new.emergency_contact.clone(),
                created_at,
            },
            password_hash: new.password_hash.clone(),
        })
    }

    /// Look up a user by phone number.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Corrupt`] if the stored row cannot be mapped.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<StoredUser>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_stored).transpose()
    }

    /// Look up a user by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Corrupt`] if the stored row cannot be mapped.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<StoredUser>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_stored).transpose()
    }
}

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Age in years.
    pub age: i32,
    /// bcrypt password hash.
    pub password_hash: String,
    /// Emergency contact name.
    pub emergency_contact_name: String,
    /// Emergency contact phone.
    pub emergency_contact_phone: String,
    /// Emergency contact relation.
    pub emergency_contact_relation: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Map the row back into the domain shape.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Corrupt`] if the stored age does not fit in `u16`.
    pub fn into_stored(self) -> Result<StoredUser, DbError> {
        let age = u16::try_from(self.age)
            .map_err(|e| DbError::Corrupt(format!("user {} has age {}: {e}", self.id, self.age)))?;

        Ok(StoredUser {
            user: User {
                id: UserId::from(self.id),
                name: self.name,
                phone: self.phone,
                age,
                emergency_contact: EmergencyContact {
                    name: self.emergency_contact_name,
                    phone: self.emergency_contact_phone,
                    relation: self.emergency_contact_relation,
                },
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}
