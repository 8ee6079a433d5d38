/// Application configuration
///
/// All knobs the map and data layers need, with sensible defaults baked in.
/// An optional `stagekaart.json` in the working directory overrides them;
/// a malformed file logs a warning and the defaults win.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional override file
pub const CONFIG_FILE: &str = "stagekaart.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Path of the bundled company data file
    pub data_file: PathBuf,

    /// Raster tile URL template with {z}/{x}/{y} placeholders
    pub tile_url: String,

    /// Initial camera center (latitude, longitude)
    pub initial_center: (f64, f64),

    /// Initial camera zoom
    pub initial_zoom: f64,

    /// Hard zoom ceiling for the camera
    pub max_zoom: f64,

    /// Zoom level a fly-to animation lands on
    pub fly_to_zoom: f64,

    /// Fly-to animation duration in seconds
    pub fly_to_seconds: f64,

    /// Cluster grouping radius in screen pixels
    pub cluster_radius: f32,

    /// Zoom level at which clustering turns off entirely
    pub cluster_disable_zoom: f64,

    /// Students with a year at or past this count as recent activity.
    /// None means "last calendar year".
    pub recent_year_threshold: Option<i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/companies.json"),
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            // Middle of the Netherlands, same framing the map opens with
            initial_center: (52.1326, 5.2913),
            initial_zoom: 7.0,
            max_zoom: 18.0,
            fly_to_zoom: 14.0,
            fly_to_seconds: 1.5,
            cluster_radius: 60.0,
            cluster_disable_zoom: 14.0,
            recent_year_threshold: None,
        }
    }
}

impl AppConfig {
    /// Load the config, falling back to defaults when the override file is
    /// absent or malformed
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    println!("⚙️  Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    eprintln!("⚠️  Ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// The effective recent-activity threshold year
    pub fn threshold_year(&self) -> i32 {
        self.recent_year_threshold
            .unwrap_or_else(|| chrono::Utc::now().year() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_map_framing() {
        let config = AppConfig::default();
        assert_eq!(config.initial_center, (52.1326, 5.2913));
        assert_eq!(config.initial_zoom, 7.0);
        assert_eq!(config.fly_to_zoom, 14.0);
        assert_eq!(config.cluster_disable_zoom, 14.0);
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"initial_zoom": 9.5}"#).unwrap();
        assert_eq!(config.initial_zoom, 9.5);
        assert_eq!(config.cluster_radius, 60.0);
    }

    #[test]
    fn explicit_threshold_wins_over_calendar() {
        let mut config = AppConfig::default();
        config.recent_year_threshold = Some(2020);
        assert_eq!(config.threshold_year(), 2020);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
