pub mod catalog;
pub mod config;
pub mod data;
pub mod gps;
pub mod layout;
pub mod marker;
pub mod navigation;
pub mod session;

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

pub use catalog::Catalog;
pub use config::NavConfig;
pub use session::Session;

/// Category of a catalog entry, taken from the `objectType` column.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Planet,
    Moon,
    Wormhole,
    DangerZone,
    UserObject,
    /// Any other `objectType` value (stations, asteroids, ...).
    Other,
}

impl BodyKind {
    pub fn from_object_type(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "planet" => BodyKind::Planet,
            "moon" => BodyKind::Moon,
            "wormhole" => BodyKind::Wormhole,
            "danger_zone" => BodyKind::DangerZone,
            "user_object" => BodyKind::UserObject,
            _ => BodyKind::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
            BodyKind::Wormhole => "wormhole",
            BodyKind::DangerZone => "danger_zone",
            BodyKind::UserObject => "user_object",
            BodyKind::Other => "other",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 24-bit RGB colour.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF_FF_FF);

    /// Parses `0x`-prefixed, `#`-prefixed or bare hex. Eight-digit values
    /// carry an alpha byte, which is dropped.
    pub fn parse_hex(value: &str) -> Option<Rgb> {
        let value = value.trim();
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .or_else(|| value.strip_prefix('#'))
            .unwrap_or(value);
        if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .map(|raw| Rgb(raw & 0xFF_FF_FF))
    }

    /// Lenient variant used for catalog columns: anything unparsable is white.
    pub fn parse_or_white(value: &str) -> Rgb {
        Self::parse_hex(value).unwrap_or(Rgb::WHITE)
    }

    pub fn to_hex_string(self) -> String {
        format!("#{:06x}", self.0)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub kind: BodyKind,
    /// Human-readable type from the `type` column.
    pub type_label: String,
    /// Position in metres.
    pub position: DVec3,
    pub diameter_km: f64,
    pub color: Rgb,
    /// Declared gravity range in kilometres, if any.
    pub gravity_range_km: Option<f64>,
    pub contained_objects: Vec<String>,
    pub description: String,
    pub resources: String,
    pub poetic_description: String,
    pub is_user_supplied: bool,
    /// Import file a user-supplied body came from.
    pub source_file: Option<String>,
}

impl CelestialBody {
    pub fn new(name: impl Into<String>, kind: BodyKind, position: DVec3, diameter_km: f64) -> Self {
        CelestialBody {
            name: name.into(),
            kind,
            type_label: String::new(),
            position,
            diameter_km: diameter_km.max(0.0),
            color: Rgb::WHITE,
            gravity_range_km: None,
            contained_objects: Vec::new(),
            description: String::new(),
            resources: String::new(),
            poetic_description: String::new(),
            is_user_supplied: false,
            source_file: None,
        }
    }

    /// Physical radius in metres.
    pub fn radius_m(&self) -> f64 {
        self.diameter_km * 1000.0 / 2.0
    }

    pub fn distance(&self, other: &CelestialBody) -> f64 {
        self.position.distance(other.position)
    }

    pub fn distance_to_point(&self, p: DVec3) -> f64 {
        self.position.distance(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_prefixes() {
        assert_eq!(Rgb::parse_hex("0xFF0000"), Some(Rgb(0xFF0000)));
        assert_eq!(Rgb::parse_hex("#00ff00"), Some(Rgb(0x00FF00)));
        assert_eq!(Rgb::parse_hex("0000ff"), Some(Rgb(0x0000FF)));
        assert_eq!(Rgb::parse_hex("#FF75C9F1"), Some(Rgb(0x75C9F1)));
        assert_eq!(Rgb::parse_or_white("zzz"), Rgb::WHITE);
        assert_eq!(Rgb::parse_or_white(""), Rgb::WHITE);
    }

    #[test]
    fn colour_digits_must_all_be_hex() {
        assert_eq!(Rgb::parse_hex("#+FF"), None);
        assert_eq!(Rgb::parse_hex("0x-1"), None);
        assert_eq!(Rgb::parse_hex("#12 34"), None);
        assert_eq!(Rgb::parse_or_white("+FF"), Rgb::WHITE);
    }

    #[test]
    fn object_type_mapping() {
        assert_eq!(BodyKind::from_object_type("planet"), BodyKind::Planet);
        assert_eq!(BodyKind::from_object_type(" Danger_Zone "), BodyKind::DangerZone);
        assert_eq!(BodyKind::from_object_type("station"), BodyKind::Other);
    }

    #[test]
    fn radius_is_half_diameter_in_metres() {
        let body = CelestialBody::new("A", BodyKind::Planet, DVec3::ZERO, 10.0);
        assert_eq!(body.radius_m(), 5000.0);
    }
}
