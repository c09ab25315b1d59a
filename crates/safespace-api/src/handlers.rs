//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness check |
//! | `GET` | `/api/experiences` | List experience stories, newest first |
//! | `POST` | `/api/experiences` | Share an experience story |
//! | `POST` | `/api/location/check-danger` | Classify a coordinate |
//!
//! Registration and login live in [`crate::accounts`], heart-rate
//! submission in [`crate::heart_rate`].

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use safespace_db::NewExperience;
use safespace_types::{Coordinate, DangerVerdict, Experience};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"OK"`.
    pub status: String,
    /// Human-readable status line.
    pub message: String,
    /// Currently connected heart-rate listeners.
    pub listeners: usize,
    /// Wards in the loaded safety dataset.
    pub wards: usize,
}

/// Body of `POST /api/experiences`.
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    /// Name to share the story under.
    pub name: Option<String>,
    /// The story text.
    pub story: Option<String>,
}

/// Body of `POST /api/location/check-danger`.
#[derive(Debug, Default, Deserialize)]
pub struct DangerCheckRequest {
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
}

impl DangerCheckRequest {
    fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report that the server is up.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("OK"),
        message: String::from("Server is running"),
        listeners: state.hub.listener_count(),
        wards: state.classifier.dataset().len(),
    })
}

// ---------------------------------------------------------------------------
// /api/experiences
// ---------------------------------------------------------------------------

/// List all experience stories, newest first.
pub async fn list_experiences(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Experience>>, ApiError> {
    let experiences = state.store.list_experiences().await?;
    Ok(Json(experiences))
}

/// Share an experience story.
///
/// When `require_auth_for_experiences` is set, anonymous submissions are
/// rejected with 401. A verified token always stamps the author.
pub async fn create_experience(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    payload: Result<Json<ExperienceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Experience>), ApiError> {
    let user_id = if state.settings.require_auth_for_experiences {
        Some(identity.require()?)
    } else {
        identity.0
    };

    let Json(request) = payload?;
    let name = request.name.map(|n| n.trim().to_owned()).unwrap_or_default();
    let story = request.story.map(|s| s.trim().to_owned()).unwrap_or_default();
    if name.is_empty() || story.is_empty() {
        return Err(ApiError::Validation(String::from(
            "Name and story are required",
        )));
    }

    let experience = state
        .store
        .create_experience(&NewExperience {
            name,
            story,
            user_id,
        })
        .await?;

    tracing::info!(
        experience_id = %experience.id,
        authenticated = user_id.is_some(),
        "Experience shared"
    );

    Ok((StatusCode::CREATED, Json(experience)))
}

// ---------------------------------------------------------------------------
// POST /api/location/check-danger
// ---------------------------------------------------------------------------

/// Classify a coordinate as dangerous or safe.
pub async fn check_danger(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DangerCheckRequest>, JsonRejection>,
) -> Result<Json<DangerVerdict>, ApiError> {
    let Json(request) = payload?;
    let coordinate = request.coordinate().ok_or_else(|| {
        ApiError::Validation(String::from("Latitude and longitude are required"))
    })?;

    let verdict = state.classifier.classify(coordinate)?;
    Ok(Json(verdict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_needs_both_fields() {
        let only_lat = DangerCheckRequest {
            latitude: Some(13.0),
            longitude: None,
        };
        assert!(only_lat.coordinate().is_none());

        let both = DangerCheckRequest {
            latitude: Some(13.0),
            longitude: Some(80.2),
        };
        assert!(both.coordinate().is_some());
    }

    #[test]
    fn zero_coordinates_are_valid() {
        let origin = DangerCheckRequest {
            latitude: Some(0.0),
            longitude: Some(0.0),
        };
        assert!(origin.coordinate().is_some());
    }
}
