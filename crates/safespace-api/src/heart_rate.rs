//! HTTP entry point for heart-rate samples.
//!
//! `POST /heart-rate-update` feeds the same [`HeartRateHub`] as the
//! `WebSocket` endpoint, so HTTP submitters and socket peers see one
//! stream.
//!
//! [`HeartRateHub`]: safespace_live::HeartRateHub

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use safespace_types::HeartRateReading;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Acknowledgment for an accepted sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateAck {
    /// Always `"Heart rate data received"`.
    pub message: String,
    /// Listeners the sample was delivered to.
    pub delivered_to: usize,
}

/// Accept a heart-rate reading and broadcast it to every listener.
///
/// A missing or non-numeric `bpm` is rejected with 400 before anything is
/// broadcast.
pub async fn submit_heart_rate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HeartRateReading>, JsonRejection>,
) -> Result<Json<HeartRateAck>, ApiError> {
    let Json(reading) = payload?;
    tracing::info!(bpm = reading.bpm, fear = reading.fear, "Heart rate received");

    let receipt = state.hub.submit(reading);

    Ok(Json(HeartRateAck {
        message: String::from("Heart rate data received"),
        delivered_to: receipt.delivered_to,
    }))
}
