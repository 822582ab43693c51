//! Core data types for the fire detection dataset
//!
//! This module defines the fundamental types shared by every view builder:
//! - `Month`: The 12-entry month enum used by both tables
//! - `FireDetectionRecord`: A single geolocated detection cluster
//! - `StateMonthAggregate`: Pre-aggregated detections per state and month
//! - `LocationOfInterest`: Reference coordinates for a state
//! - `Dataset`: The immutable, loaded-once collection of all of the above

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::{DatasetError, DatasetResult};

/// Calendar month
///
/// Both input tables key their rows by month. The point table historically
/// stores month numbers (`8`) while the aggregate table stores 3-letter codes
/// (`Aug`), so parsing accepts either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month {
    Jan = 1,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Month number, 1 (January) through 12 (December)
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Zero-based position in [`Month::ALL`]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Look up a month by its 1-based number
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1..=12 => Some(Self::ALL[number as usize - 1]),
            _ => None,
        }
    }

    /// 3-letter display code (`Jan`, `Feb`, ...)
    pub fn code(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// Full English name (`January`, ...)
    pub fn name(self) -> &'static str {
        chrono::Month::from(self).name()
    }
}

impl From<Month> for chrono::Month {
    fn from(month: Month) -> Self {
        // Both enums share calendar order, and the index is always in 0..12.
        chrono::Month::try_from(month.number()).unwrap_or(chrono::Month::January)
    }
}

/// Error returned when a value cannot be interpreted as a month
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid month '{0}': expected 1-12, a 3-letter code (Jan..Dec) or a month name")]
pub struct MonthParseError(pub String);

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(number) = trimmed.parse::<u32>() {
            return Month::from_number(number).ok_or_else(|| MonthParseError(s.to_string()));
        }

        // Tables exported from dataframes sometimes carry floats ("8.0")
        if let Ok(number) = trimmed.parse::<f64>() {
            if number.fract() == 0.0 && (1.0..=12.0).contains(&number) {
                return Month::from_number(number as u32)
                    .ok_or_else(|| MonthParseError(s.to_string()));
            }
            return Err(MonthParseError(s.to_string()));
        }

        if let Some(month) = Month::ALL
            .iter()
            .find(|m| m.code().eq_ignore_ascii_case(trimmed))
        {
            return Ok(*month);
        }

        // Full names ("August") are handled by chrono's parser
        trimmed
            .parse::<chrono::Month>()
            .ok()
            .and_then(|m| Month::from_number(m.number_from_month()))
            .ok_or_else(|| MonthParseError(s.to_string()))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MonthVisitor)
    }
}

struct MonthVisitor;

impl<'de> Visitor<'de> for MonthVisitor {
    type Value = Month;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a month number (1-12) or month code")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Month, E> {
        u32::try_from(v)
            .ok()
            .and_then(Month::from_number)
            .ok_or_else(|| E::custom(MonthParseError(v.to_string())))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Month, E> {
        u32::try_from(v)
            .ok()
            .and_then(Month::from_number)
            .ok_or_else(|| E::custom(MonthParseError(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Month, E> {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Month, E> {
        v.parse().map_err(E::custom)
    }
}

/// A geolocated fire detection cluster
///
/// Column names follow the exported tables; the short aliases (`lat`, `lon`,
/// `num`) match older exports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FireDetectionRecord {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
    #[serde(alias = "num")]
    pub count: u64,
    pub month: Month,
}

impl FireDetectionRecord {
    pub fn new(latitude: f64, longitude: f64, count: u64, month: Month) -> Self {
        Self {
            latitude,
            longitude,
            count,
            month,
        }
    }
}

/// Number of detections for one state in one month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateMonthAggregate {
    pub state: String,
    pub month: Month,
    #[serde(alias = "num")]
    pub count: u64,
}

impl StateMonthAggregate {
    pub fn new(state: impl Into<String>, month: Month, count: u64) -> Self {
        Self {
            state: state.into(),
            month,
            count,
        }
    }
}

/// Reference coordinates for a selectable state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationOfInterest {
    pub name: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
}

impl LocationOfInterest {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Built-in location table, in dropdown order
pub fn default_locations() -> Vec<LocationOfInterest> {
    vec![
        LocationOfInterest::new("Washington", 47.7511, -120.7401),
        LocationOfInterest::new("Oregon", 43.8041, -120.5542),
        LocationOfInterest::new("California", 36.7783, -119.4179),
    ]
}

/// The complete, immutable input to every view builder
///
/// Constructed once at startup and shared by reference. Nothing in the
/// crate mutates a dataset after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    points: Vec<FireDetectionRecord>,
    aggregates: Vec<StateMonthAggregate>,
    locations: Vec<LocationOfInterest>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Build a dataset from already-parsed tables
    ///
    /// Fails only when the location table is empty, since the first location
    /// provides the default state selection.
    pub fn new(
        points: Vec<FireDetectionRecord>,
        aggregates: Vec<StateMonthAggregate>,
        locations: Vec<LocationOfInterest>,
    ) -> DatasetResult<Self> {
        if locations.is_empty() {
            return Err(DatasetError::NoLocations);
        }

        Ok(Self {
            points,
            aggregates,
            locations,
            loaded_at: Utc::now(),
        })
    }

    pub fn points(&self) -> &[FireDetectionRecord] {
        &self.points
    }

    pub fn aggregates(&self) -> &[StateMonthAggregate] {
        &self.aggregates
    }

    pub fn locations(&self) -> &[LocationOfInterest] {
        &self.locations
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Name of the state selected before the user picks one
    pub fn default_state(&self) -> &str {
        // `new` guarantees at least one location
        self.locations
            .first()
            .map(|l| l.name.as_str())
            .unwrap_or_default()
    }

    /// Look up a location by exact name
    pub fn location(&self, name: &str) -> Option<&LocationOfInterest> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Detection points recorded in the given month, in table order
    pub fn points_in_month(&self, month: Month) -> impl Iterator<Item = &FireDetectionRecord> {
        self.points.iter().filter(move |p| p.month == month)
    }

    /// Sum of aggregate counts for one state and month (0 when absent)
    pub fn aggregate_count(&self, state: &str, month: Month) -> u64 {
        self.aggregates
            .iter()
            .filter(|a| a.month == month && a.state == state)
            .fold(0u64, |acc, a| acc.saturating_add(a.count))
    }

    /// Aggregate counts for one state, indexed by [`Month::index`]
    pub fn monthly_counts(&self, state: &str) -> [u64; 12] {
        let mut counts = [0u64; 12];
        for aggregate in self.aggregates.iter().filter(|a| a.state == state) {
            let slot = &mut counts[aggregate.month.index()];
            *slot = slot.saturating_add(aggregate.count);
        }
        counts
    }

    /// Sum of counts across the entire point table
    ///
    /// Sums saturate at `u64::MAX` rather than overflow.
    pub fn total_count(&self) -> u64 {
        self.points
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.count))
    }

    /// Summary statistics for health reporting
    pub fn stats(&self) -> DatasetStats {
        let states: BTreeSet<&str> = self.aggregates.iter().map(|a| a.state.as_str()).collect();

        DatasetStats {
            point_rows: self.points.len(),
            aggregate_rows: self.aggregates.len(),
            locations: self.locations.len(),
            states: states.len(),
            total_count: self.total_count(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Dataset statistics
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub point_rows: usize,
    pub aggregate_rows: usize,
    pub locations: usize,
    pub states: usize,
    pub total_count: u64,
    pub loaded_at: DateTime<Utc>,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Points: {}, Aggregates: {} ({} states), Locations: {}, Total count: {}",
            self.point_rows, self.aggregate_rows, self.states, self.locations, self.total_count
        )
    }
}
