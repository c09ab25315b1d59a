//! Danger classification for a queried coordinate.
//!
//! No geofencing is performed: neither policy maps the coordinate onto a
//! ward polygon. Both draw a ward uniformly at random from the dataset and
//! differ only in how the verdict is decided.
//!
//! | Policy | Verdict |
//! |--------|---------|
//! | [`ClassificationPolicy::Threshold`] | [`evaluate`] on the drawn ward |
//! | [`ClassificationPolicy::Simulation`] | dangerous with probability [`SIMULATED_DANGER_PROBABILITY`] |
//!
//! `Threshold` is the default. `Simulation` is a placeholder for demos and
//! must be switched on explicitly.

use std::sync::Arc;

use rand::Rng;
use safespace_types::{Coordinate, DangerVerdict, WardRecord};
use serde::Deserialize;

use crate::dataset::SafetyDataset;
use crate::error::SafetyError;

/// Wards scoring strictly below this are dangerous.
pub const SAFETY_SCORE_THRESHOLD: f64 = 3.0;

/// Wards reporting strictly more crimes than this are dangerous.
pub const CRIME_REPORTED_THRESHOLD: u32 = 150;

/// Probability that the simulation policy flags the drawn ward.
pub const SIMULATED_DANGER_PROBABILITY: f64 = 0.3;

/// How a verdict is derived from the drawn ward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPolicy {
    /// Random-ward simulation: the verdict is a coin flip.
    Simulation,
    /// Data-driven: the verdict follows the ward's safety metrics.
    #[default]
    Threshold,
}

impl ClassificationPolicy {
    /// Stable name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simulation => "simulation",
            Self::Threshold => "threshold",
        }
    }
}

/// Whether a ward's metrics cross either danger threshold.
///
/// Both comparisons are strict, so a ward with a score of exactly 3.0 and
/// exactly 150 reported crimes is safe.
pub fn is_dangerous(ward: &WardRecord) -> bool {
    ward.perceived_safety_score_women < SAFETY_SCORE_THRESHOLD
        || ward.crime_reported > CRIME_REPORTED_THRESHOLD
}

/// Apply the threshold rule to a single ward.
pub fn evaluate(ward: &WardRecord) -> DangerVerdict {
    if is_dangerous(ward) {
        DangerVerdict::dangerous(ward)
    } else {
        DangerVerdict::safe()
    }
}

/// Classifies coordinates against a loaded [`SafetyDataset`].
///
/// The classifier only exists once the dataset has been loaded, and the
/// dataset is shared read-only, so concurrent calls need no locking.
#[derive(Debug, Clone)]
pub struct DangerClassifier {
    dataset: Arc<SafetyDataset>,
    policy: ClassificationPolicy,
}

impl DangerClassifier {
    /// Create a classifier over an already-loaded dataset.
    pub const fn new(dataset: Arc<SafetyDataset>, policy: ClassificationPolicy) -> Self {
        Self { dataset, policy }
    }

    /// The active policy.
    pub const fn policy(&self) -> ClassificationPolicy {
        self.policy
    }

    /// The dataset this classifier draws from.
    pub fn dataset(&self) -> &SafetyDataset {
        &self.dataset
    }

    /// Classify a coordinate using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::EmptyDataset`] if there are no wards to draw from.
    pub fn classify(&self, coordinate: Coordinate) -> Result<DangerVerdict, SafetyError> {
        self.classify_with(coordinate, &mut rand::rng())
    }

    /// Classify a coordinate using the supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::EmptyDataset`] if there are no wards to draw from.
    pub fn classify_with<R: Rng>(
        &self,
        coordinate: Coordinate,
        rng: &mut R,
    ) -> Result<DangerVerdict, SafetyError> {
        let ward = self.draw_ward(rng)?;

        let verdict = match self.policy {
            ClassificationPolicy::Threshold => evaluate(ward),
            ClassificationPolicy::Simulation => {
                if rng.random_bool(SIMULATED_DANGER_PROBABILITY) {
                    DangerVerdict::dangerous(ward)
                } else {
                    DangerVerdict::safe()
                }
            }
        };

        tracing::debug!(
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            policy = self.policy.as_str(),
            ward_number = ward.ward_number,
            is_dangerous = verdict.is_dangerous,
            "Danger check classified"
        );

        Ok(verdict)
    }

    fn draw_ward<R: Rng>(&self, rng: &mut R) -> Result<&WardRecord, SafetyError> {
        if self.dataset.is_empty() {
            return Err(SafetyError::EmptyDataset);
        }
        let index = rng.random_range(0..self.dataset.len());
        self.dataset.get(index).ok_or(SafetyError::EmptyDataset)
    }
}
