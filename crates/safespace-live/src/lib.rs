//! Realtime heart-rate fan-out for the SafeSpace backend.
//!
//! A wearable (or the companion app) submits heart-rate readings over HTTP
//! or a WebSocket. Each reading is stamped on receipt and rebroadcast to
//! every listener connected at that moment. Nothing is buffered for late
//! listeners and nothing is persisted.
//!
//! See [`hub`] for the delivery and slow-listener policy.

pub mod hub;

pub use hub::{DEFAULT_CAPACITY, HeartRateHub, HeartRateSubscription, Receipt};
