//! Ward safety lookup for the SafeSpace backend.
//!
//! Two pieces, leaf-first:
//!
//! - [`dataset`] -- loads the per-ward CSV into an immutable
//!   [`SafetyDataset`] exactly once at startup (all-or-nothing)
//! - [`classifier`] -- [`DangerClassifier`] turns a coordinate into a
//!   [`DangerVerdict`](safespace_types::DangerVerdict) using the threshold
//!   rule `score < 3.0 || crime > 150`
//!
//! # Lifecycle
//!
//! ```text
//! startup:  SafetyDataset::load(path) --Arc--> DangerClassifier::new(..)
//! request:  classifier.classify(coordinate) -> DangerVerdict
//! ```

pub mod classifier;
pub mod dataset;
pub mod error;

pub use classifier::{
    ClassificationPolicy, DangerClassifier, CRIME_REPORTED_THRESHOLD, SAFETY_SCORE_THRESHOLD,
    evaluate, is_dangerous,
};
pub use dataset::{SafetyDataset, REQUIRED_COLUMNS};
pub use error::SafetyError;
