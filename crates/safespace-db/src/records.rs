//! Insert payloads and stored shapes exchanged with the stores.

use safespace_types::{EmergencyContact, User, UserId};

/// A user about to be registered. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Phone number (must be unique).
    pub phone: String,
    /// Age in years.
    pub age: u16,
    /// bcrypt hash of the user's password.
    pub password_hash: String,
    /// Emergency contact details.
    pub emergency_contact: EmergencyContact,
}

/// A user as stored: the public profile plus the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    /// Public profile.
    pub user: User,
    /// bcrypt hash used to verify logins.
    pub password_hash: String,
}

/// An experience story about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExperience {
    /// Name the story is shared under.
    pub name: String,
    /// The story text.
    pub story: String,
    /// Author, if the submission was authenticated.
    pub user_id: Option<UserId>,
}
