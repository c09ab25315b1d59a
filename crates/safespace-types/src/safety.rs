//! Ward safety records and the danger verdicts derived from them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One row of the per-ward safety dataset.
///
/// Records are created once when the dataset is loaded and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WardRecord {
    /// Administrative ward number.
    pub ward_number: u32,
    /// Human-readable locality name.
    pub locality: String,
    /// Perceived safety score for women. Lower is less safe.
    pub perceived_safety_score_women: f64,
    /// Number of crimes reported in the ward.
    pub crime_reported: u32,
}

/// Result of a danger check.
///
/// The ward fields are only populated (and only serialized) when
/// `is_dangerous` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DangerVerdict {
    /// Whether the queried location is considered unsafe.
    pub is_dangerous: bool,
    /// Ward number of the implicated ward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub ward_number: Option<u32>,
    /// Locality of the implicated ward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub locality: Option<String>,
    /// Perceived safety score of the implicated ward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub safety_score: Option<f64>,
}

impl DangerVerdict {
    /// A verdict with no danger and no ward details.
    pub const fn safe() -> Self {
        Self {
            is_dangerous: false,
            ward_number: None,
            locality: None,
            safety_score: None,
        }
    }

    /// A dangerous verdict naming `ward`.
    pub fn dangerous(ward: &WardRecord) -> Self {
        Self {
            is_dangerous: true,
            ward_number: Some(ward.ward_number),
            locality: Some(ward.locality.clone()),
            safety_score: Some(ward.perceived_safety_score_women),
        }
    }
}

/// A geographic coordinate in decimal degrees.
///
/// No range validation is performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ward_45() -> WardRecord {
        WardRecord {
            ward_number: 45,
            locality: String::from("Locality_45"),
            perceived_safety_score_women: 2.5,
            crime_reported: 200,
        }
    }

    #[test]
    fn safe_verdict_omits_ward_fields() {
        let json = serde_json::to_value(DangerVerdict::safe()).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "isDangerous": false }));
    }

    #[test]
    fn dangerous_verdict_carries_ward_fields() {
        let json = serde_json::to_value(DangerVerdict::dangerous(&ward_45())).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({
                "isDangerous": true,
                "wardNumber": 45,
                "locality": "Locality_45",
                "safetyScore": 2.5,
            })
        );
    }

    #[test]
    fn ward_record_uses_camel_case() {
        let json = serde_json::to_value(ward_45()).unwrap_or_default();
        assert_eq!(json["perceivedSafetyScoreWomen"], 2.5);
        assert_eq!(json["crimeReported"], 200);
    }
}
