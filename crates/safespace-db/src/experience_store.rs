//! Operations on the `experiences` table.

use chrono::{DateTime, Utc};
use safespace_types::{Experience, ExperienceId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::records::NewExperience;

/// Operations on the `experiences` table.
pub struct ExperienceStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ExperienceStore<'a> {
    /// Create a new experience store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new experience and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownUser`] if the author does not exist, or
    /// [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, new: &NewExperience) -> Result<Experience, DbError> {
        let experience = Experience {
            id: ExperienceId::new(),
            name: new.name.clone(),
            story: new.story.clone(),
            user_id: new.user_id,
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            r"INSERT INTO experiences (id, name, story, user_id, created_at)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(experience.id.into_inner())
        .bind(&experience.name)
        .bind(&experience.story)
        .bind(experience.user_id.map(UserId::into_inner))
        .bind(experience.created_at)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                if let Some(author) = new.user_id {
                    return Err(DbError::UnknownUser(author));
                }
                return Err(sqlx::Error::Database(e).into());
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(experience_id = %experience.id, "Inserted experience");
        Ok(experience)
    }

    /// All experiences, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_newest_first(&self) -> Result<Vec<Experience>, DbError> {
        let rows = sqlx::query_as::<_, ExperienceRow>(
            r"SELECT id, name, story, user_id, created_at
              FROM experiences
              ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Experience::from).collect())
    }
}

/// A row from the `experiences` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExperienceRow {
    /// Experience ID.
    pub id: Uuid,
    /// Name the story is shared under.
    pub name: String,
    /// Story text.
    pub story: String,
    /// Author, if known.
    pub user_id: Option<Uuid>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl From<ExperienceRow> for Experience {
    fn from(row: ExperienceRow) -> Self {
        Self {
            id: ExperienceId::from(row.id),
            name: row.name,
            story: row.story,
            user_id: row.user_id.map(UserId::from),
            created_at: row.created_at,
        }
    }
}
