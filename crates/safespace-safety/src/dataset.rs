//! Per-ward safety dataset loaded once at startup.
//!
//! The dataset is a CSV file with (at least) the columns `Ward Number`,
//! `Locality`, `Perceived_Safety_Score_Women` and `Crime_Reported`. Extra
//! columns are ignored. Loading is all-or-nothing: one bad row fails the
//! whole load, so the classifier never sees a partially parsed table.
//!
//! The loaded [`SafetyDataset`] is immutable. Callers wrap it in an
//! [`Arc`](std::sync::Arc) and hand it to the classifier.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use safespace_types::WardRecord;
use serde::Deserialize;

use crate::error::SafetyError;

/// Columns every dataset file must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    "Ward Number",
    "Locality",
    "Perceived_Safety_Score_Women",
    "Crime_Reported",
];

/// Raw CSV row, keyed by the dataset's column headers.
#[derive(Debug, Deserialize)]
struct WardRow {
    #[serde(rename = "Ward Number")]
    ward_number: u32,
    #[serde(rename = "Locality")]
    locality: String,
    #[serde(rename = "Perceived_Safety_Score_Women")]
    perceived_safety_score_women: f64,
    #[serde(rename = "Crime_Reported")]
    crime_reported: u32,
}

impl WardRow {
    fn into_record(self, row: usize) -> Result<WardRecord, SafetyError> {
        if self.locality.is_empty() {
            return Err(SafetyError::Malformed {
                row,
                message: String::from("empty Locality"),
            });
        }
        if !self.perceived_safety_score_women.is_finite() {
            return Err(SafetyError::Malformed {
                row,
                message: format!(
                    "non-finite Perceived_Safety_Score_Women: {}",
                    self.perceived_safety_score_women
                ),
            });
        }
        Ok(WardRecord {
            ward_number: self.ward_number,
            locality: self.locality,
            perceived_safety_score_women: self.perceived_safety_score_women,
            crime_reported: self.crime_reported,
        })
    }
}

/// Immutable, ordered collection of ward records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafetyDataset {
    wards: Vec<WardRecord>,
}

impl SafetyDataset {
    /// Load the dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::DataLoad`] if the file cannot be opened, and
    /// any error from [`SafetyDataset::from_reader`] if its contents are
    /// malformed.
    pub fn load(path: &Path) -> Result<Self, SafetyError> {
        let file = File::open(path).map_err(|source| SafetyError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            wards = dataset.len(),
            "Safety dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse the dataset from any CSV source.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::MissingColumn`] if the header lacks a
    /// required column, or [`SafetyError::Malformed`] for the first row
    /// that is missing a field or holds an unparsable value.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SafetyError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(|e| SafetyError::Malformed {
            row: 0,
            message: e.to_string(),
        })?;
        if let Some(column) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(SafetyError::MissingColumn { column: *column });
        }

        let mut wards = Vec::new();
        for (index, result) in csv_reader.deserialize::<WardRow>().enumerate() {
            let row = index.saturating_add(1);
            let raw = result.map_err(|e| SafetyError::Malformed {
                row,
                message: e.to_string(),
            })?;
            wards.push(raw.into_record(row)?);
        }

        Ok(Self { wards })
    }

    /// Build a dataset from already-parsed records.
    pub const fn from_records(wards: Vec<WardRecord>) -> Self {
        Self { wards }
    }

    /// The ward at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&WardRecord> {
        self.wards.get(index)
    }

    /// Number of wards.
    pub fn len(&self) -> usize {
        self.wards.len()
    }

    /// Whether the dataset has no wards.
    pub fn is_empty(&self) -> bool {
        self.wards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Ward Number,Locality,Zone,Perceived_Safety_Score_Women,Crime_Reported
1,Locality_1,North,6.8,42
45,Locality_45,Central,2.5,200
";

    #[test]
    fn parses_rows_in_order_and_ignores_extra_columns() {
        let dataset = SafetyDataset::from_reader(SAMPLE.as_bytes());
        assert!(dataset.is_ok());
        let dataset = dataset.unwrap_or_default();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(0).map(|w| w.ward_number), Some(1));
        let ward = dataset.get(1);
        assert_eq!(ward.map(|w| w.ward_number), Some(45));
        assert_eq!(ward.map(|w| w.locality.as_str()), Some("Locality_45"));
        assert_eq!(ward.map(|w| w.crime_reported), Some(200));
    }

    #[test]
    fn trims_whitespace_around_fields() {
        let csv = "Ward Number , Locality , Perceived_Safety_Score_Women , Crime_Reported\n 7 , Adyar , 4.1 , 90 \n";
        let dataset = SafetyDataset::from_reader(csv.as_bytes()).unwrap_or_default();
        assert_eq!(dataset.get(0).map(|w| w.locality.as_str()), Some("Adyar"));
    }

    #[test]
    fn missing_column_fails_whole_load() {
        let csv = "Ward Number,Locality,Crime_Reported\n1,Locality_1,10\n";
        let result = SafetyDataset::from_reader(csv.as_bytes());
        assert!(matches!(
            result,
            Err(SafetyError::MissingColumn {
                column: "Perceived_Safety_Score_Women"
            })
        ));
    }

    #[test]
    fn missing_field_in_row_fails_whole_load() {
        let csv = "\
Ward Number,Locality,Perceived_Safety_Score_Women,Crime_Reported
1,Locality_1,6.8,42
2,Locality_2,,17
";
        let result = SafetyDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(SafetyError::Malformed { row: 2, .. })));
    }

    #[test]
    fn unparsable_crime_count_is_malformed() {
        let csv = "\
Ward Number,Locality,Perceived_Safety_Score_Women,Crime_Reported
1,Locality_1,6.8,lots
";
        let result = SafetyDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(SafetyError::Malformed { row: 1, .. })));
    }

    #[test]
    fn empty_locality_is_malformed() {
        let csv = "\
Ward Number,Locality,Perceived_Safety_Score_Women,Crime_Reported
1,,6.8,3
";
        let result = SafetyDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(SafetyError::Malformed { row: 1, .. })));
    }

    #[test]
    fn nan_score_is_malformed() {
        let csv = "\
Ward Number,Locality,Perceived_Safety_Score_Women,Crime_Reported
1,Locality_1,NaN,3
";
        let result = SafetyDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(SafetyError::Malformed { row: 1, .. })));
    }

    #[test]
    fn header_only_file_loads_empty() {
        let csv = "Ward Number,Locality,Perceived_Safety_Score_Women,Crime_Reported\n";
        let dataset = SafetyDataset::from_reader(csv.as_bytes());
        assert!(dataset.is_ok_and(|d| d.is_empty()));
    }

    #[test]
    fn bundled_dataset_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../data/Chennai_200_Wards_SafetyData.csv");
        let dataset = SafetyDataset::load(&path);
        assert!(dataset.is_ok());
        let dataset = dataset.unwrap_or_default();
        assert_eq!(dataset.len(), 200);
        let ward = dataset.get(44);
        assert_eq!(ward.map(|w| w.ward_number), Some(45));
        assert_eq!(ward.map(|w| w.crime_reported), Some(200));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = SafetyDataset::load(Path::new("does/not/exist.csv"));
        assert!(matches!(result, Err(SafetyError::DataLoad { .. })));
        assert!(result.is_err_and(|e| e.is_load_error()));
    }
}
