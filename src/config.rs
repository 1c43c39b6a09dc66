//! Tunable constants for navigation, layout and marker handling.
//!
//! Every field has a default matching the in-game values, so an empty JSON
//! object (or no file at all) yields a usable configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "STARMAP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    /// Clearance kept between a ship and any body surface, metres.
    pub ship_safety_margin_m: f64,
    /// Cruise speed used for travel time estimates, m/s.
    pub nominal_speed_mps: f64,
    /// Margin added around auto-sized danger zones when the zone has no
    /// gravityRange of its own, kilometres.
    pub danger_zone_margin_km: f64,
    /// Pixels per orbit unit in the 2D view.
    pub orbit_scale_px: f64,
    /// Factor applied to tabulated moon distances in the 2D view.
    pub moon_orbit_scale: f64,
    /// Smallest radius of the ring holding non-planet, non-moon bodies.
    pub ring_min_radius_px: f64,
    /// Gap between the outermost planet orbit and that ring.
    pub ring_margin_px: f64,
    /// Maximum number of non-persistent markers kept at once.
    pub marker_limit: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        NavConfig {
            ship_safety_margin_m: 100.0,
            nominal_speed_mps: 100.0,
            danger_zone_margin_km: 50.0,
            orbit_scale_px: 120.0,
            moon_orbit_scale: 0.8,
            ring_min_radius_px: 400.0,
            ring_margin_px: 100.0,
            marker_limit: 10,
        }
    }
}

impl NavConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_json(&text)
    }

    /// Loads the file named by `STARMAP_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                log::info!("loading navigation config from {}", Path::new(&path).display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = NavConfig::from_json(r#"{"nominal_speed_mps": 250.0}"#).unwrap();
        assert_eq!(cfg.nominal_speed_mps, 250.0);
        assert_eq!(cfg.ship_safety_margin_m, 100.0);
        assert_eq!(cfg.marker_limit, 10);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            NavConfig::from_json("{nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
