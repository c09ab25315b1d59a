//! Persisted entities owned by the storage boundary: users and the
//! experience stories they share.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ExperienceId, UserId};

/// Person to alert when the user is in danger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EmergencyContact {
    /// Contact's name.
    pub name: String,
    /// Contact's phone number.
    pub phone: String,
    /// Relation to the user (e.g. "sister").
    pub relation: String,
}

/// A registered user's public profile.
///
/// The password hash is deliberately not part of this type; the storage
/// layer keeps it alongside the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Phone number. Unique across users and used as the login handle.
    pub phone: String,
    /// Age in years.
    pub age: u16,
    /// Emergency contact details.
    pub emergency_contact: EmergencyContact,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A shared safety experience story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Experience {
    /// Unique experience identifier.
    pub id: ExperienceId,
    /// Name the story is shared under.
    pub name: String,
    /// The story text.
    pub story: String,
    /// Author, when the submission was authenticated.
    pub user_id: Option<UserId>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_serializes_camel_case() {
        let experience = Experience {
            id: ExperienceId::new(),
            name: String::from("Anon"),
            story: String::from("Felt followed near the station."),
            user_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&experience).unwrap_or_default();
        assert!(json.get("createdAt").is_some());
        assert!(json["userId"].is_null());
        assert_eq!(json["story"], "Felt followed near the station.");
    }

    #[test]
    fn user_round_trips_emergency_contact() {
        let json = serde_json::json!({
            "id": UserId::new(),
            "name": "Asha",
            "phone": "9000000001",
            "age": 24,
            "emergencyContact": { "name": "Ravi", "phone": "9000000002", "relation": "brother" },
            "createdAt": "2026-01-01T00:00:00Z",
        });
        let user: Option<User> = serde_json::from_value(json).ok();
        assert_eq!(
            user.map(|u| u.emergency_contact.relation),
            Some(String::from("brother"))
        );
    }
}
