//! `WebSocket` endpoint for the live heart-rate stream.
//!
//! Clients connect to `GET /ws`. Each connection is both a listener and a
//! potential submitter:
//!
//! - inbound text frames shaped `{"event":"heartRateUpdate","data":{...}}`
//!   are submitted to the hub, which rebroadcasts them to every peer
//!   including the sender
//! - every sample from the hub goes out as the same envelope, with `data`
//!   carrying the stamped `{bpm, fear, timestamp}`
//!
//! Frames that are not valid heart-rate events are logged at debug level
//! and ignored; the connection stays open.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use safespace_types::{HeartRateReading, HeartRateSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::AppState;

/// Event name for heart-rate frames in both directions.
pub const HEART_RATE_EVENT: &str = "heartRateUpdate";

/// JSON envelope for socket frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketEvent<T> {
    /// Event name.
    pub event: String,
    /// Event payload.
    pub data: T,
}

/// Parse an inbound text frame into a reading.
///
/// Returns `None` for unknown events and malformed payloads.
pub fn parse_heart_rate_event(text: &str) -> Option<HeartRateReading> {
    let envelope: SocketEvent<serde_json::Value> = serde_json::from_str(text).ok()?;
    if envelope.event != HEART_RATE_EVENT {
        return None;
    }
    serde_json::from_value(envelope.data).ok()
}

/// Encode an outbound sample as a heart-rate event frame.
///
/// # Errors
///
/// Returns the serializer error if encoding fails.
pub fn encode_heart_rate_event(sample: &HeartRateSample) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SocketEvent {
        event: String::from(HEART_RATE_EVENT),
        data: sample,
    })
}

/// Upgrade an HTTP request to a `WebSocket` connection on the heart-rate
/// stream.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_heart_rate(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drive one connection until either side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = state.hub.subscribe();
    debug!(listeners = state.hub.listener_count(), "WebSocket client connected");

    loop {
        tokio::select! {
            // Forward samples from the hub.
            sample = subscription.recv() => {
                let Some(sample) = sample else {
                    debug!("Heart-rate hub closed, shutting down WebSocket");
                    break;
                };
                let json = match encode_heart_rate_event(&sample) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize heart-rate sample: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!("WebSocket client disconnected (send failed)");
                    break;
                }
            }
            // Handle frames from the client.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reading) = parse_heart_rate_event(text.as_str()) {
                            let receipt = state.hub.submit(reading);
                            debug!(
                                bpm = reading.bpm,
                                delivered_to = receipt.delivered_to,
                                "Heart rate received over WebSocket"
                            );
                        } else {
                            debug!("Ignoring malformed WebSocket frame");
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    subscription.unsubscribe();
}
