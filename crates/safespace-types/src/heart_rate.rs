//! Heart-rate readings and the timestamped samples broadcast to listeners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A heart-rate reading as submitted by a client.
///
/// `bpm` must be a JSON number. `fear` is asserted by the caller (usually
/// the wearable's classifier) and defaults to `false` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeartRateReading {
    /// Beats per minute.
    pub bpm: f64,
    /// Whether the submitter flagged this reading as fear-induced.
    #[serde(default)]
    pub fear: bool,
}

impl HeartRateReading {
    /// Attach a receipt timestamp, producing a broadcastable sample.
    pub const fn stamp(self, timestamp: DateTime<Utc>) -> HeartRateSample {
        HeartRateSample {
            bpm: self.bpm,
            fear: self.fear,
            timestamp,
        }
    }
}

/// A heart-rate reading annotated with the time it was received.
///
/// Samples only exist for the duration of fan-out delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeartRateSample {
    /// Beats per minute.
    pub bpm: f64,
    /// Caller-asserted fear flag.
    pub fear: bool,
    /// Receipt time (UTC).
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fear_defaults_to_false() {
        let reading: Option<HeartRateReading> =
            serde_json::from_str(r#"{"bpm": 88}"#).ok();
        assert_eq!(
            reading,
            Some(HeartRateReading {
                bpm: 88.0,
                fear: false
            })
        );
    }

    #[test]
    fn non_numeric_bpm_is_rejected() {
        assert!(serde_json::from_str::<HeartRateReading>(r#"{"bpm": "fast"}"#).is_err());
        assert!(serde_json::from_str::<HeartRateReading>(r#"{"fear": true}"#).is_err());
    }

    #[test]
    fn stamp_keeps_reading_fields() {
        let now = Utc::now();
        let sample = HeartRateReading {
            bpm: 120.5,
            fear: true,
        }
        .stamp(now);
        assert!(sample.fear);
        assert_eq!(sample.timestamp, now);
        assert!((sample.bpm - 120.5).abs() < f64::EPSILON);
    }
}
