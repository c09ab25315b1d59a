//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::accounts;
use crate::auth::LEGACY_TOKEN_HEADER;
use crate::handlers;
use crate::heart_rate;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /api/auth/register`
/// - `POST /api/auth/login`
/// - `GET|POST /api/experiences`
/// - `POST /api/location/check-danger`
/// - `POST /heart-rate-update`
/// - `GET /api/health`
/// - `GET /ws` -- heart-rate `WebSocket` stream
///
/// CORS allows any origin, since the mobile client is not served from a
/// fixed host.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(LEGACY_TOKEN_HEADER),
        ]);

    Router::new()
        // Accounts
        .route("/api/auth/register", post(accounts::register))
        .route("/api/auth/login", post(accounts::login))
        // Experiences
        .route(
            "/api/experiences",
            get(handlers::list_experiences).post(handlers::create_experience),
        )
        // Safety
        .route("/api/location/check-danger", post(handlers::check_danger))
        // Heart rate
        .route("/heart-rate-update", post(heart_rate::submit_heart_rate))
        .route("/ws", get(ws::ws_heart_rate))
        // Status
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
