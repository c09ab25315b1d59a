//! In-memory store with the same contract as the `PostgreSQL` stores.
//!
//! Used when no database URL is configured (local development) and by the
//! API integration tests. Data lives for the lifetime of the process.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use safespace_types::{Experience, ExperienceId, User, UserId};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::records::{NewExperience, NewUser, StoredUser};

#[derive(Debug, Default)]
struct Tables {
    /// Users keyed by phone number (the unique login handle).
    users: BTreeMap<String, StoredUser>,
    experiences: Vec<Experience>,
}

/// Process-local store. Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuplicatePhone`] if the phone number is taken.
    pub async fn insert_user(&self, new: &NewUser) -> Result<StoredUser, DbError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&new.phone) {
            return Err(DbError::DuplicatePhone(new.phone.clone()));
        }

        let stored = StoredUser {
            user: User {
                id: UserId::new(),
                name: new.name.clone(),
                phone: new.phone.clone(),
                age: new.age,
                emergency_contact: new.emergency_contact.clone(),
                created_at: Utc::now(),
            },
            password_hash: new.password_hash.clone(),
        };
        tables.users.insert(new.phone.clone(), stored.clone());
        Ok(stored)
    }

    /// Look up a user by phone number.
    pub async fn find_user_by_phone(&self, phone: &str) -> Option<StoredUser> {
        self.tables.read().await.users.get(phone).cloned()
    }

    /// Look up a user by ID.
    pub async fn find_user_by_id(&self, id: UserId) -> Option<StoredUser> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.user.id == id)
            .cloned()
    }

    /// Insert a new experience and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownUser`] if the author is not registered.
    pub async fn insert_experience(&self, new: &NewExperience) -> Result<Experience, DbError> {
        let mut tables = self.tables.write().await;
        if let Some(author) = new
            .user_id
            .filter(|author| !tables.users.values().any(|u| u.user.id == *author))
        {
            return Err(DbError::UnknownUser(author));
        }

        let experience = Experience {
            id: ExperienceId::new(),
            name: new.name.clone(),
            story: new.story.clone(),
            user_id: new.user_id,
            created_at: Utc::now(),
        };
        tables.experiences.push(experience.clone());
        Ok(experience)
    }

    /// All experiences, newest first.
    pub async fn list_experiences(&self) -> Vec<Experience> {
        let mut experiences: Vec<Experience> =
            self.tables.read().await.experiences.iter().rev().cloned().collect();
        // Stable sort: equal timestamps keep most-recently-inserted first.
        experiences.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        experiences
    }
}

#[cfg(test)]
mod tests {
    use safespace_types::EmergencyContact;

    use super::*;

    fn new_user(phone: &str) -> NewUser {
        NewUser {
            name: String::from("Asha"),
            phone: phone.to_owned(),
            age: 24,
            password_hash: String::from("$2b$04$hash"),
            emergency_contact: EmergencyContact {
                name: String::from("Ravi"),
                phone: String::from("9000000002"),
                relation: String::from("brother"),
            },
        }
    }

    #[tokio::test]
    async fn duplicate_phone_is_rejected() {
        let store = MemoryStore::new();
        assert!(store.insert_user(&new_user("9000000001")).await.is_ok());
        let second = store.insert_user(&new_user("9000000001")).await;
        assert!(matches!(second, Err(DbError::DuplicatePhone(p)) if p == "9000000001"));
    }

    #[tokio::test]
    async fn users_are_found_by_phone_and_id() {
        let store = MemoryStore::new();
        let stored = store.insert_user(&new_user("9000000003")).await;
        let id = stored.map(|s| s.user.id).ok();

        let by_phone = store.find_user_by_phone("9000000003").await;
        assert_eq!(by_phone.as_ref().map(|s| s.user.id), id);
        assert_eq!(
            by_phone.map(|s| s.password_hash),
            Some(String::from("$2b$04$hash"))
        );

        if let Some(id) = id {
            assert!(store.find_user_by_id(id).await.is_some());
        }
        assert!(store.find_user_by_phone("0000000000").await.is_none());
    }

    #[tokio::test]
    async fn experiences_are_listed_newest_first() {
        let store = MemoryStore::new();
        for story in ["first", "second", "third"] {
            store
                .insert_experience(&NewExperience {
                    name: String::from("Anon"),
                    story: story.to_owned(),
                    user_id: None,
                })
                .await
                .ok();
        }

        let stories: Vec<_> = store
            .list_experiences()
            .await
            .into_iter()
            .map(|e| e.story)
            .collect();
        assert_eq!(stories, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn experience_by_unregistered_author_is_rejected() {
        let store = MemoryStore::new();
        let ghost = UserId::new();
        let result = store
            .insert_experience(&NewExperience {
                name: String::from("Anon"),
                story: String::from("orphan"),
                user_id: Some(ghost),
            })
            .await;
        assert!(matches!(result, Err(DbError::UnknownUser(id)) if id == ghost));
        assert!(store.list_experiences().await.is_empty());
    }

    #[tokio::test]
    async fn experience_by_registered_author_keeps_user_id() {
        let store = MemoryStore::new();
        let author = store
            .insert_user(&new_user("9000000004"))
            .await
            .map(|s| s.user.id)
            .ok();
        let experience = store
            .insert_experience(&NewExperience {
                name: String::from("Asha"),
                story: String::from("signed"),
                user_id: author,
            })
            .await;
        assert_eq!(experience.ok().and_then(|e| e.user_id), author);
    }

    #[tokio::test]
    async fn clones_share_tables() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone
            .insert_experience(&NewExperience {
                name: String::from("Anon"),
                story: String::from("shared"),
                user_id: None,
            })
            .await
            .ok();
        assert_eq!(store.list_experiences().await.len(), 1);
    }
}
