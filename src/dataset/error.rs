//! Dataset error types
//!
//! Every error here is fatal at startup: the service never runs with a
//! partially loaded dataset.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading the dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Input file could not be opened or read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be parsed
    #[error("Malformed row in {source_name} at line {line}: {message}")]
    Malformed {
        source_name: String,
        line: u64,
        message: String,
    },

    /// CSV structure error without a row position (bad header, encoding)
    #[error("Invalid CSV in {source_name}: {message}")]
    Csv {
        source_name: String,
        message: String,
    },

    /// The location table is empty, so there is no default state
    #[error("At least one location of interest is required")]
    NoLocations,
}

impl DatasetError {
    /// Classify a csv error, keeping the line number when csv reports one
    pub(crate) fn from_csv(source_name: &str, err: csv::Error) -> Self {
        if let csv::ErrorKind::Io(_) = err.kind() {
            return DatasetError::Io {
                path: PathBuf::from(source_name),
                source: std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
            };
        }

        match err.position() {
            Some(position) => DatasetError::Malformed {
                source_name: source_name.to_string(),
                line: position.line(),
                message: err.to_string(),
            },
            None => DatasetError::Csv {
                source_name: source_name.to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::Malformed {
            source_name: "points.csv".to_string(),
            line: 4,
            message: "bad count".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed row in points.csv at line 4: bad count"
        );

        assert_eq!(
            DatasetError::NoLocations.to_string(),
            "At least one location of interest is required"
        );
    }
}
