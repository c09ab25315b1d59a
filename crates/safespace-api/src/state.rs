//! Shared application state for the API server.
//!
//! [`AppState`] is built once at startup and injected into handlers via
//! Axum's `State` extractor (wrapped in [`Arc`](std::sync::Arc)). Nothing
//! in it is guarded by a lock at this level:
//!
//! - the classifier reads an immutable dataset snapshot
//! - the heart-rate hub owns its own concurrency-safe registry
//! - the store manages its own pool or lock

use safespace_db::Store;
use safespace_live::HeartRateHub;
use safespace_safety::DangerClassifier;

use crate::auth::{PasswordHasher, TokenIssuer};

/// Request-handling policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApiSettings {
    /// Whether `POST /api/experiences` rejects anonymous submissions.
    pub require_auth_for_experiences: bool,
}

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// User and experience persistence.
    pub store: Store,
    /// Danger classifier over the loaded ward dataset.
    pub classifier: DangerClassifier,
    /// Heart-rate fan-out shared by the HTTP and `WebSocket` entry points.
    pub hub: HeartRateHub,
    /// Bearer token issuer/verifier.
    pub tokens: TokenIssuer,
    /// bcrypt password hasher.
    pub passwords: PasswordHasher,
    /// Policy knobs.
    pub settings: ApiSettings,
}

impl AppState {
    /// Assemble application state from its collaborators.
    pub const fn new(
        store: Store,
        classifier: DangerClassifier,
        hub: HeartRateHub,
        tokens: TokenIssuer,
        passwords: PasswordHasher,
        settings: ApiSettings,
    ) -> Self {
        Self {
            store,
            classifier,
            hub,
            tokens,
            passwords,
            settings,
        }
    }
}
