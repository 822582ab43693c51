//! Map Builder
//!
//! Builds the detection map for the current selection: a point layer for the
//! selected month, a static layer of reference locations, and the viewport.
//!
//! The point table carries no state column, so points are filtered by month
//! only. The selected state re-centers the map but does not narrow the points.

use serde::Serialize;

use super::selection::Selection;
use crate::dataset::{Dataset, LocationOfInterest, Month};

/// Gradient used to color detection points, from low to high count
pub const POINT_COLOR_SCALE: [ColorStop; 4] = [
    ColorStop {
        position: 0.0,
        color: "#21c7ef",
    },
    ColorStop {
        position: 0.33,
        color: "#76f2ff",
    },
    ColorStop {
        position: 0.66,
        color: "#ff6969",
    },
    ColorStop {
        position: 1.0,
        color: "#ff1717",
    },
];

pub const REFERENCE_MARKER_COLOR: &str = "#ffa0a0";

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<&LocationOfInterest> for GeoPoint {
    fn from(location: &LocationOfInterest) -> Self {
        Self::new(location.latitude, location.longitude)
    }
}

/// Map presentation settings supplied at startup
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Access token for the tile provider
    pub access_token: String,
    /// Tile style name
    pub style: String,
    pub bearing: f64,
    /// Center used when the selected state has no known location
    pub default_center: GeoPoint,
    pub default_zoom: f64,
    /// Zoom used when centering on a selected state
    pub selected_zoom: f64,
    /// Count mapped to the top of the color scale
    pub color_max: u64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            style: "dark".to_string(),
            bearing: 0.0,
            default_center: GeoPoint::new(43.8041, -120.5542),
            default_zoom: 10.0,
            selected_zoom: 12.0,
            color_max: 2000,
        }
    }
}

/// Complete map descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFigure {
    pub month: Option<Month>,
    pub points: PointLayer,
    pub references: ReferenceLayer,
    pub viewport: Viewport,
    /// Target of the "reset zoom" control
    pub reset_viewport: Viewport,
    pub style: String,
    pub access_token: String,
}

/// Detection points, as parallel columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointLayer {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub counts: Vec<u64>,
    pub marker: PointMarker,
}

impl PointLayer {
    pub fn len(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMarker {
    pub color_scale: Vec<ColorStop>,
    pub cmin: u64,
    pub cmax: u64,
    pub opacity: f64,
    pub size: u32,
    pub show_scale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: &'static str,
}

/// Static markers for every location of interest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLayer {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub names: Vec<String>,
    pub color: &'static str,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
    pub bearing: f64,
    /// Location the viewport is centered on, when a known state is selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centered_on: Option<String>,
}

/// Viewport for the selected state
pub fn viewport_for(dataset: &Dataset, settings: &MapSettings, state: &str) -> Viewport {
    match dataset.location(state) {
        Some(location) => Viewport {
            center: location.into(),
            zoom: settings.selected_zoom,
            bearing: settings.bearing,
            centered_on: Some(location.name.clone()),
        },
        None => {
            tracing::debug!(state = %state, "No location for state, using default viewport");
            default_viewport(settings)
        }
    }
}

fn default_viewport(settings: &MapSettings) -> Viewport {
    Viewport {
        center: settings.default_center,
        zoom: settings.default_zoom,
        bearing: settings.bearing,
        centered_on: None,
    }
}

/// Build the map for the current selection
///
/// With no month selected the point layer is empty.
pub fn build_map(dataset: &Dataset, settings: &MapSettings, selection: &Selection) -> MapFigure {
    let mut lat = Vec::new();
    let mut lon = Vec::new();
    let mut counts = Vec::new();

    if let Some(month) = selection.month {
        // Filtered by month only: the point table has no state column.
        for point in dataset.points_in_month(month) {
            lat.push(point.latitude);
            lon.push(point.longitude);
            counts.push(point.count);
        }
    }

    let locations = dataset.locations();

    MapFigure {
        month: selection.month,
        points: PointLayer {
            lat,
            lon,
            counts,
            marker: PointMarker {
                color_scale: POINT_COLOR_SCALE.to_vec(),
                cmin: 0,
                cmax: settings.color_max,
                opacity: 0.5,
                size: 5,
                show_scale: true,
            },
        },
        references: ReferenceLayer {
            lat: locations.iter().map(|l| l.latitude).collect(),
            lon: locations.iter().map(|l| l.longitude).collect(),
            names: locations.iter().map(|l| l.name.clone()).collect(),
            color: REFERENCE_MARKER_COLOR,
            size: 8,
        },
        viewport: viewport_for(dataset, settings, &selection.state),
        reset_viewport: default_viewport(settings),
        style: settings.style.clone(),
        access_token: settings.access_token.clone(),
    }
}
