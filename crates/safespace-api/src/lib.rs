//! HTTP and `WebSocket` API for the SafeSpace backend.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Accounts** (`/api/auth/register`, `/api/auth/login`): bcrypt
//!   password hashing and HS256 bearer tokens
//! - **Experiences** (`/api/experiences`): shared safety stories, listed
//!   newest first
//! - **Danger checks** (`/api/location/check-danger`): classification
//!   against the loaded ward dataset
//! - **Heart-rate fan-out** (`POST /heart-rate-update`, `GET /ws`): both
//!   entry points submit to one [`HeartRateHub`]
//!
//! # Architecture
//!
//! All handlers share one [`AppState`] behind an [`Arc`](std::sync::Arc).
//! The dataset is an immutable snapshot, the hub is a broadcast channel,
//! and the store is either `PostgreSQL` or in-memory. Every failure is an
//! [`ApiError`] rendered as `{"message", "status"}`.
//!
//! [`HeartRateHub`]: safespace_live::HeartRateHub

pub mod accounts;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod heart_rate;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use auth::{Identity, PasswordHasher, TokenIssuer};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve_until, start_server};
pub use state::{ApiSettings, AppState};
