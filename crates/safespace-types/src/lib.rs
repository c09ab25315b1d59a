//! Shared type definitions for the SafeSpace backend.
//!
//! This crate is the single source of truth for the types exchanged between
//! the API, the safety classifier, the heart-rate fan-out and storage.
//! Types flow downstream to `TypeScript` via `ts-rs` for the mobile client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for users and experiences
//! - [`safety`] -- Ward records, coordinates and danger verdicts
//! - [`heart_rate`] -- Heart-rate readings and broadcast samples
//! - [`structs`] -- Persisted users and experiences

pub mod heart_rate;
pub mod ids;
pub mod safety;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use heart_rate::{HeartRateReading, HeartRateSample};
pub use ids::{ExperienceId, UserId};
pub use safety::{Coordinate, DangerVerdict, WardRecord};
pub use structs::{EmergencyContact, Experience, User};

#[cfg(test)]
mod tests {
    #[test]
    fn export_bindings() {
        // Writes TypeScript bindings to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::ExperienceId::export_all();
        let _ = crate::safety::WardRecord::export_all();
        let _ = crate::safety::DangerVerdict::export_all();
        let _ = crate::safety::Coordinate::export_all();
        let _ = crate::heart_rate::HeartRateReading::export_all();
        let _ = crate::heart_rate::HeartRateSample::export_all();
        let _ = crate::structs::EmergencyContact::export_all();
        let _ = crate::structs::User::export_all();
        let _ = crate::structs::Experience::export_all();
    }
}
