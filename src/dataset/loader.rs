//! CSV Loading
//!
//! Reads the point table and the state/month aggregate table into a
//! [`Dataset`]. Columns are matched by header name, so column order and
//! extra columns (such as an exported index column) do not matter.

use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::error::{DatasetError, DatasetResult};
use super::types::{
    default_locations, Dataset, FireDetectionRecord, LocationOfInterest, StateMonthAggregate,
};

/// Loads both input tables from disk
pub struct DatasetLoader {
    /// Point-level detection table
    points_path: PathBuf,
    /// State/month aggregate table
    aggregates_path: PathBuf,
    /// Location table used for centering and reference markers
    locations: Vec<LocationOfInterest>,
}

impl DatasetLoader {
    /// Create a loader for the two tables with the built-in location table
    pub fn new(points_path: impl Into<PathBuf>, aggregates_path: impl Into<PathBuf>) -> Self {
        Self {
            points_path: points_path.into(),
            aggregates_path: aggregates_path.into(),
            locations: default_locations(),
        }
    }

    /// Replace the location table
    pub fn with_locations(mut self, locations: Vec<LocationOfInterest>) -> Self {
        self.locations = locations;
        self
    }

    /// Load both tables and build the dataset
    pub fn load(&self) -> DatasetResult<Dataset> {
        let points = load_points(&self.points_path)?;
        let aggregates = load_aggregates(&self.aggregates_path)?;

        tracing::info!(
            points_path = %self.points_path.display(),
            aggregates_path = %self.aggregates_path.display(),
            point_rows = points.len(),
            aggregate_rows = aggregates.len(),
            "Loaded fire detection tables"
        );

        Dataset::new(points, aggregates, self.locations.clone())
    }
}

/// Read the point table from a file
pub fn load_points(path: &Path) -> DatasetResult<Vec<FireDetectionRecord>> {
    read_rows(open(path)?, &path.display().to_string())
}

/// Read the aggregate table from a file
pub fn load_aggregates(path: &Path) -> DatasetResult<Vec<StateMonthAggregate>> {
    read_rows(open(path)?, &path.display().to_string())
}

/// Parse the point table from a string (useful for testing)
pub fn points_from_str(csv_data: &str) -> DatasetResult<Vec<FireDetectionRecord>> {
    read_rows(csv_data.as_bytes(), "<inline points>")
}

/// Parse the aggregate table from a string (useful for testing)
pub fn aggregates_from_str(csv_data: &str) -> DatasetResult<Vec<StateMonthAggregate>> {
    read_rows(csv_data.as_bytes(), "<inline aggregates>")
}

fn open(path: &Path) -> DatasetResult<std::fs::File> {
    std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize every row, failing on the first malformed one
fn read_rows<T, R>(reader: R, source_name: &str) -> DatasetResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        let row = result.map_err(|e| DatasetError::from_csv(source_name, e))?;
        rows.push(row);
    }

    tracing::debug!(source = source_name, rows = rows.len(), "Parsed CSV table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::Month;
    use std::io::Write;

    #[test]
    fn test_points_from_str() {
        let csv_data = "longitude,latitude,count,month
-120.5,47.2,12,8
-121.0,44.9,3,Aug
-119.0,36.1,40,7";

        let points = points_from_str(csv_data).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].month, Month::Aug);
        assert_eq!(points[1].month, Month::Aug);
        assert_eq!(points[2].count, 40);
        assert_eq!(points[0].latitude, 47.2);
    }

    #[test]
    fn test_points_short_column_names_and_index_column() {
        let csv_data = ",lat,lon,num,month
0,47.2,-120.5,12,8
1,44.9,-121.0,3,9";

        let points = points_from_str(csv_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].month, Month::Sep);
        assert_eq!(points[1].longitude, -121.0);
    }

    #[test]
    fn test_aggregates_from_str() {
        let csv_data = "month,count,state
Jan,4,Washington
Aug, 120 ,Washington
Aug,75,Oregon";

        let aggregates = aggregates_from_str(csv_data).unwrap();
        assert_eq!(aggregates.len(), 3);
        assert_eq!(aggregates[1].count, 120);
        assert_eq!(aggregates[2].state, "Oregon");
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let csv_data = "month,count,state
Jan,4,Washington
Jan,lots,Oregon";

        let err = aggregates_from_str(csv_data).unwrap_err();
        match err {
            DatasetError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_month_is_malformed() {
        let csv_data = "longitude,latitude,count,month
-120.5,47.2,12,13";

        assert!(matches!(
            points_from_str(csv_data),
            Err(DatasetError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_points(Path::new("/nonexistent/points.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_loader_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let points_path = dir.path().join("points.csv");
        let aggregates_path = dir.path().join("aggregates.csv");

        let mut f = std::fs::File::create(&points_path).unwrap();
        writeln!(f, "longitude,latitude,count,month").unwrap();
        writeln!(f, "-120.5,47.2,12,8").unwrap();

        let mut f = std::fs::File::create(&aggregates_path).unwrap();
        writeln!(f, "month,count,state").unwrap();
        writeln!(f, "Aug,12,Washington").unwrap();

        let dataset = DatasetLoader::new(&points_path, &aggregates_path)
            .load()
            .unwrap();
        assert_eq!(dataset.points().len(), 1);
        assert_eq!(dataset.aggregates().len(), 1);
        assert_eq!(dataset.default_state(), "Washington");

        let err = DatasetLoader::new(&points_path, &aggregates_path)
            .with_locations(Vec::new())
            .load()
            .unwrap_err();
        assert!(matches!(err, DatasetError::NoLocations));
    }
}
