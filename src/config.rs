//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dashboard::{GeoPoint, MapSettings};
use crate::dataset::{default_locations, DatasetLoader, LocationOfInterest};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Overrides the built-in location table when non-empty
    #[serde(default)]
    pub locations: Vec<LocationOfInterest>,
}

/// Input table locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_points_path")]
    pub points_path: PathBuf,

    #[serde(default = "default_aggregates_path")]
    pub aggregates_path: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("firemap"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

fn default_points_path() -> PathBuf {
    default_data_dir().join("cluster_over_month.csv")
}

fn default_aggregates_path() -> PathBuf {
    default_data_dir().join("states_over_month.csv")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            points_path: default_points_path(),
            aggregates_path: default_aggregates_path(),
        }
    }
}

/// Map tile and viewport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Tile provider access token; never compiled in
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_map_style")]
    pub style: String,

    #[serde(default)]
    pub bearing: f64,

    #[serde(default = "default_center_lat")]
    pub default_lat: f64,

    #[serde(default = "default_center_lon")]
    pub default_lon: f64,

    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    #[serde(default = "default_selected_zoom")]
    pub selected_zoom: f64,

    #[serde(default = "default_color_max")]
    pub color_max: u64,
}

fn default_map_style() -> String {
    "dark".to_string()
}

fn default_center_lat() -> f64 {
    43.8041
}

fn default_center_lon() -> f64 {
    -120.5542
}

fn default_zoom() -> f64 {
    10.0
}

fn default_selected_zoom() -> f64 {
    12.0
}

fn default_color_max() -> u64 {
    2000
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            style: default_map_style(),
            bearing: 0.0,
            default_lat: default_center_lat(),
            default_lon: default_center_lon(),
            default_zoom: default_zoom(),
            selected_zoom: default_selected_zoom(),
            color_max: default_color_max(),
        }
    }
}

impl MapConfig {
    /// Settings consumed by the map builder
    pub fn settings(&self) -> MapSettings {
        MapSettings {
            access_token: self.access_token.clone(),
            style: self.style.clone(),
            bearing: self.bearing,
            default_center: GeoPoint::new(self.default_lat, self.default_lon),
            default_zoom: self.default_zoom,
            selected_zoom: self.selected_zoom,
            color_max: self.color_max,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means permissive
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum number of concurrent live sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Standard config file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("firemap").join("config.toml")),
            Some(PathBuf::from("/etc/firemap/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// First standard config file that exists
    pub fn find_default() -> Option<PathBuf> {
        Self::default_paths().into_iter().find(|p| p.exists())
    }

    /// Load from the standard locations, or defaults plus environment
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first_of(&Self::default_paths())
    }

    /// Load the first existing file of `paths` with environment overrides
    ///
    /// Falls back to defaults plus environment when none of them exist.
    pub fn load_first_of(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match paths.iter().find(|p| p.exists()) {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::from_env()),
        }
    }

    /// Location table in effect
    pub fn locations(&self) -> Vec<LocationOfInterest> {
        if self.locations.is_empty() {
            default_locations()
        } else {
            self.locations.clone()
        }
    }

    /// Dataset loader for the configured tables and locations
    pub fn dataset_loader(&self) -> DatasetLoader {
        DatasetLoader::new(&self.data.points_path, &self.data.aggregates_path)
            .with_locations(self.locations())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Data overrides
        if let Ok(path) = std::env::var("FIREMAP_POINTS_PATH") {
            self.data.points_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("FIREMAP_AGGREGATES_PATH") {
            self.data.aggregates_path = PathBuf::from(path);
        }

        // Map overrides
        if let Ok(token) = std::env::var("FIREMAP_MAP_TOKEN") {
            self.map.access_token = token;
        }

        // API overrides
        if let Ok(host) = std::env::var("FIREMAP_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("FIREMAP_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("FIREMAP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FIREMAP_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            map: MapConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
            locations: Vec::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Firemap Configuration
#
# Environment variables override these settings:
# - FIREMAP_POINTS_PATH
# - FIREMAP_AGGREGATES_PATH
# - FIREMAP_MAP_TOKEN
# - FIREMAP_API_HOST
# - FIREMAP_API_PORT
# - FIREMAP_LOG_LEVEL
# - FIREMAP_LOG_FORMAT

[data]
# Point-level detection table: longitude, latitude, count, month
points_path = "./data/cluster_over_month.csv"

# State/month aggregate table: month, count, state
aggregates_path = "./data/states_over_month.csv"

[map]
# Tile provider access token (prefer FIREMAP_MAP_TOKEN)
access_token = ""

# Tile style
style = "dark"
bearing = 0.0

# Viewport used when no known state is selected
default_lat = 43.8041
default_lon = -120.5542
default_zoom = 10.0

# Zoom used when centering on a selected state
selected_zoom = 12.0

# Detection count mapped to the top of the color scale
color_max = 2000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8050

# Allowed CORS origins (empty = allow any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Maximum concurrent live sessions
max_sessions = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Location table (dropdown order; the first entry is the default state)
[[locations]]
name = "Washington"
latitude = 47.7511
longitude = -120.7401

[[locations]]
name = "Oregon"
latitude = 43.8041
longitude = -120.5542

[[locations]]
name = "California"
latitude = 36.7783
longitude = -119.4179
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_toml(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8050);
        assert_eq!(config.map.color_max, 2000);
        assert_eq!(config.locations.len(), 3);
        assert_eq!(config.locations[0].name, "Washington");
        assert_eq!(
            config.data.points_path,
            PathBuf::from("./data/cluster_over_month.csv")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
[map]
access_token = "pk.test"
"#,
        )
        .unwrap();

        assert_eq!(config.map.access_token, "pk.test");
        assert_eq!(config.map.style, "dark");
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(config.locations.is_empty());
        assert_eq!(config.locations(), default_locations());
    }

    #[test]
    fn test_map_settings_conversion() {
        let settings = MapConfig::default().settings();
        assert_eq!(settings, MapSettings::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml("[api]\nport = \"eighty\""),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/firemap.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_api_addr() {
        assert_eq!(ApiConfig::new("127.0.0.1", 9000).addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_malformed_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = \"eighty\"\n").unwrap();

        let paths = vec![dir.path().join("missing.toml"), path.clone()];
        match Config::load_first_of(&paths) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_first_of_picks_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        std::fs::write(&first, "[map]\ncolor_max = 500\n").unwrap();
        std::fs::write(&second, "[map]\ncolor_max = 900\n").unwrap();

        let paths = vec![dir.path().join("none.toml"), first, second];
        let config = Config::load_first_of(&paths).unwrap();
        assert_eq!(config.map.color_max, 500);
    }

    #[test]
    fn test_load_first_of_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_first_of(&[dir.path().join("none.toml")]).unwrap();
        assert_eq!(config.map.color_max, 2000);
    }
}
