//! Error types for the safety dataset and classifier.

use std::path::PathBuf;

/// Errors raised while loading the dataset or classifying a location.
#[derive(Debug, thiserror::Error)]
pub enum SafetyError {
    /// The dataset file could not be opened or read.
    #[error("failed to read safety dataset {path}: {source}")]
    DataLoad {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The dataset header lacks a required column.
    #[error("safety dataset is missing required column `{column}`")]
    MissingColumn {
        /// Name of the absent column.
        column: &'static str,
    },

    /// A data row is missing a field or holds an unparsable value.
    #[error("malformed safety dataset row {row}: {message}")]
    Malformed {
        /// 1-based data row number (the header is row 0).
        row: usize,
        /// What was wrong with the row.
        message: String,
    },

    /// Classification was attempted against a dataset with no wards.
    #[error("safety dataset contains no wards")]
    EmptyDataset,
}

impl SafetyError {
    /// Whether this error came from loading the dataset (as opposed to
    /// classifying against it).
    pub const fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::DataLoad { .. } | Self::MissingColumn { .. } | Self::Malformed { .. }
        )
    }
}
