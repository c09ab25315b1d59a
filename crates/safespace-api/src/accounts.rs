//! Registration and login.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `POST` | `/api/auth/register` | 201 `{token, userId}` |
//! | `POST` | `/api/auth/login` | 200 `{token, userId}` |
//!
//! Request fields are all optional at the type level so that a missing
//! field surfaces as a 400 with a readable message instead of a serde
//! rejection.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use safespace_db::NewUser;
use safespace_types::{EmergencyContact, UserId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/auth/register`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: Option<String>,
    /// Phone number, used as the login handle.
    pub phone: Option<String>,
    /// Age in years.
    pub age: Option<u16>,
    /// Plaintext password.
    pub password: Option<String>,
    /// Emergency contact details.
    pub emergency_contact: Option<ContactRequest>,
}

/// Emergency contact as submitted at registration.
#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    /// Contact's name.
    pub name: Option<String>,
    /// Contact's phone number.
    pub phone: Option<String>,
    /// Relation to the user.
    pub relation: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Registered phone number.
    pub phone: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
}

/// Response for both registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user_id: UserId,
}

/// Trimmed, non-empty value of a required text field.
fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{field} is required")))
}

impl ContactRequest {
    fn validate(self) -> Result<EmergencyContact, ApiError> {
        Ok(EmergencyContact {
            name: required(self.name, "emergencyContact.name")?,
            phone: required(self.phone, "emergencyContact.phone")?,
            relation: required(self.relation, "emergencyContact.relation")?,
        })
    }
}

/// A fully validated registration.
struct Registration {
    name: String,
    phone: String,
    age: u16,
    password: String,
    emergency_contact: EmergencyContact,
}

impl RegisterRequest {
    fn validate(self) -> Result<Registration, ApiError> {
        let name = required(self.name, "name")?;
        let phone = required(self.phone, "phone")?;
        let age = self
            .age
            .ok_or_else(|| ApiError::Validation(String::from("age is required")))?;
        // Passwords are not trimmed.
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Validation(String::from("password is required")))?;
        let emergency_contact = self
            .emergency_contact
            .ok_or_else(|| ApiError::Validation(String::from("emergencyContact is required")))?
            .validate()?;

        Ok(Registration {
            name,
            phone,
            age,
            password,
            emergency_contact,
        })
    }
}

/// Register a new user and issue a token.
///
/// # Route
///
/// `POST /api/auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;
    let registration = request.validate()?;

    if state
        .store
        .find_user_by_phone(&registration.phone)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicatePhone);
    }

    let password_hash = state.passwords.hash(registration.password).await?;
    // The store enforces uniqueness too, so a racing duplicate still maps
    // to DuplicatePhone.
    let stored = state
        .store
        .create_user(&NewUser {
            name: registration.name,
            phone: registration.phone,
            age: registration.age,
            password_hash,
            emergency_contact: registration.emergency_contact,
        })
        .await?;

    let user_id = stored.user.id;
    let token = state.tokens.issue(user_id)?;
    tracing::info!(%user_id, "User registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user_id })))
}

/// Check a phone/password pair and issue a token.
///
/// # Route
///
/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload?;
    let phone = required(request.phone, "phone")?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation(String::from("password is required")))?;

    let stored = state
        .store
        .find_user_by_phone(&phone)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("User not found")))?;

    if !state.passwords.verify(password, stored.password_hash).await? {
        tracing::debug!(user_id = %stored.user.id, "Login rejected: wrong password");
        return Err(ApiError::InvalidPassword);
    }

    let user_id = stored.user.id;
    let token = state.tokens.issue(user_id)?;
    tracing::info!(%user_id, "User logged in");

    Ok(Json(AuthResponse { token, user_id }))
}
