//! The in-game GPS clipboard format:
//! `GPS:<name>:<x>:<y>:<z>:<#RRGGBB|#AARRGGBB>:<size>:`.
//!
//! The trailing colon is part of the format; the game rejects tokens
//! without it.

use std::fmt;

use glam::DVec3;
use thiserror::Error;

use crate::catalog::csv::parse_decimal;

pub const GPS_PREFIX: &str = "GPS:";

#[derive(Debug, Error, PartialEq)]
pub enum GpsFormatError {
    #[error("token does not start with `GPS:`")]
    MissingPrefix,
    #[error("token has {0} fields, expected 5 to 7")]
    FieldCount(usize),
    #[error("token has an empty name")]
    EmptyName,
    #[error("coordinate `{axis}` is not a number: `{value}`")]
    Coordinate { axis: char, value: String },
    #[error("invalid colour `{0}`")]
    Color(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpsColor {
    Rgb(u32),
    Argb(u32),
}

impl GpsColor {
    /// `#` followed by 6 or 8 hex digits.
    pub fn parse(value: &str) -> Option<GpsColor> {
        let digits = value.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let raw = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(GpsColor::Rgb(raw)),
            8 => Some(GpsColor::Argb(raw)),
            _ => None,
        }
    }

    pub fn rgb(self) -> u32 {
        match self {
            GpsColor::Rgb(raw) | GpsColor::Argb(raw) => raw & 0xFF_FF_FF,
        }
    }
}

impl fmt::Display for GpsColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsColor::Rgb(raw) => write!(f, "#{:06X}", raw & 0xFF_FF_FF),
            GpsColor::Argb(raw) => write!(f, "#{raw:08X}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GpsToken {
    pub name: String,
    pub position: DVec3,
    pub color: Option<GpsColor>,
    /// Marker size in metres.
    pub size_m: Option<f64>,
}

impl GpsToken {
    pub fn new(name: impl Into<String>, position: DVec3) -> Self {
        GpsToken {
            name: name.into(),
            position,
            color: None,
            size_m: None,
        }
    }

    pub fn with_color(mut self, color: GpsColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Lenient parse used for typed or pasted locations: only the prefix
    /// and three numeric coordinates are required. Returns `None` rather
    /// than an error so callers can try other location forms.
    pub fn parse_lenient(input: &str) -> Option<GpsToken> {
        let parts: Vec<&str> = input.trim().strip_prefix(GPS_PREFIX)?.split(':').collect();
        if parts.len() < 4 {
            return None;
        }
        let position = DVec3::new(
            parse_decimal(parts[1])?,
            parse_decimal(parts[2])?,
            parse_decimal(parts[3])?,
        );
        let name = match parts[0].trim() {
            "" => "GPS Point".to_string(),
            name => name.to_string(),
        };
        Some(GpsToken {
            name,
            position,
            color: parts.get(4).and_then(|c| GpsColor::parse(c.trim())),
            size_m: parts
                .get(5)
                .and_then(|s| parse_decimal(s))
                .filter(|size| *size > 0.0),
        })
    }

    /// Strict parse used when importing user data.
    pub fn parse_strict(input: &str) -> Result<GpsToken, GpsFormatError> {
        let rest = input
            .trim()
            .strip_prefix(GPS_PREFIX)
            .ok_or(GpsFormatError::MissingPrefix)?;
        let parts: Vec<&str> = rest.split(':').collect();
        if !(5..=7).contains(&parts.len()) {
            return Err(GpsFormatError::FieldCount(parts.len() + 1));
        }
        let name = parts[0].trim();
        if name.is_empty() {
            return Err(GpsFormatError::EmptyName);
        }
        let mut coords = [0.0; 3];
        for (slot, (axis, raw)) in coords.iter_mut().zip(['x', 'y', 'z'].into_iter().zip(&parts[1..4])) {
            *slot = parse_decimal(raw).ok_or_else(|| GpsFormatError::Coordinate {
                axis,
                value: raw.to_string(),
            })?;
        }

        let mut tail: Vec<&str> = parts[4..].to_vec();
        if tail.len() > 1 && tail.last() == Some(&"") {
            tail.pop();
        }
        let (color, size) = match tail.as_slice() {
            [] => (None, None),
            [first, rest @ ..] if first.starts_with('#') => {
                let color =
                    GpsColor::parse(first).ok_or_else(|| GpsFormatError::Color(first.to_string()))?;
                (Some(color), rest.first().copied())
            }
            ["", size] => (None, Some(*size)),
            [size] => (None, Some(*size)),
            _ => return Err(GpsFormatError::FieldCount(parts.len() + 1)),
        };

        Ok(GpsToken {
            name: name.to_string(),
            position: DVec3::from_array(coords),
            color,
            size_m: size.and_then(parse_decimal).filter(|s| *s > 0.0),
        })
    }

    /// Renders the token with coordinates rounded to `decimals` places.
    pub fn format_fixed(&self, decimals: usize) -> String {
        let mut out = format!(
            "{GPS_PREFIX}{}:{:.*}:{:.*}:{:.*}:",
            sanitize_name(&self.name),
            decimals,
            self.position.x,
            decimals,
            self.position.y,
            decimals,
            self.position.z
        );
        self.push_tail(&mut out);
        out
    }

    fn push_tail(&self, out: &mut String) {
        match (self.color, self.size_m) {
            (Some(color), Some(size)) => out.push_str(&format!("{color}:{size}:")),
            (Some(color), None) => out.push_str(&format!("{color}:")),
            (None, Some(size)) => out.push_str(&format!(":{size}:")),
            (None, None) => {}
        }
    }
}

/// Full-precision rendering; parsing it back yields the same coordinates.
impl fmt::Display for GpsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!(
            "{GPS_PREFIX}{}:{}:{}:{}:",
            sanitize_name(&self.name),
            self.position.x,
            self.position.y,
            self.position.z
        );
        self.push_tail(&mut out);
        f.write_str(&out)
    }
}

fn sanitize_name(name: &str) -> String {
    name.replace(':', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn parses_basic_token() {
        let token = GpsToken::parse_lenient("GPS:Home:1000:2000:3000:#FF0000:").unwrap();
        assert_eq!(token.name, "Home");
        assert_eq!(token.position, DVec3::new(1000.0, 2000.0, 3000.0));
        assert_eq!(token.color, Some(GpsColor::Rgb(0xFF0000)));
    }

    #[test]
    fn comma_decimals_and_blank_name() {
        let token = GpsToken::parse_lenient("GPS::1000,5:-2:3,25:").unwrap();
        assert_eq!(token.name, "GPS Point");
        assert_eq!(token.position, DVec3::new(1000.5, -2.0, 3.25));
    }

    #[test]
    fn lenient_rejects_non_numeric() {
        assert!(GpsToken::parse_lenient("GPS:Home:1:two:3:").is_none());
        assert!(GpsToken::parse_lenient("GPS:Home:1:2").is_none());
        assert!(GpsToken::parse_lenient("Home:1:2:3").is_none());
    }

    #[test]
    fn display_round_trips() {
        let original = GpsToken::parse_lenient("GPS:Probe:-123456.789012:0.000001:98765.4321:#FF75C9F1:")
            .unwrap();
        let again = GpsToken::parse_lenient(&original.to_string()).unwrap();
        assert_approx_eq!(again.position.x, original.position.x, 1e-6);
        assert_approx_eq!(again.position.y, original.position.y, 1e-6);
        assert_approx_eq!(again.position.z, original.position.z, 1e-6);
        assert_eq!(again.color, original.color);
        assert!(original.to_string().ends_with(':'));
    }

    #[test]
    fn fixed_format_always_ends_with_colon() {
        let token = GpsToken::new("START A", DVec3::new(1.0, 2.5, -3.0));
        assert_eq!(token.format_fixed(2), "GPS:START A:1.00:2.50:-3.00:");
        let token = token.with_color(GpsColor::Argb(0xFF75C9F1));
        assert_eq!(token.format_fixed(2), "GPS:START A:1.00:2.50:-3.00:#FF75C9F1:");
    }

    #[test]
    fn strict_accepts_extended_forms() {
        let plain = GpsToken::parse_strict("GPS:Base:1:2:3:#00FF00:").unwrap();
        assert_eq!(plain.color, Some(GpsColor::Rgb(0x00FF00)));
        assert_eq!(plain.size_m, None);

        let sized = GpsToken::parse_strict("GPS:Base:1:2:3:#00FF00:500:").unwrap();
        assert_eq!(sized.size_m, Some(500.0));

        let bare = GpsToken::parse_strict("GPS:Base:1:2:3:").unwrap();
        assert_eq!(bare.color, None);
    }

    #[test]
    fn strict_rejects_bad_tokens() {
        assert_eq!(
            GpsToken::parse_strict("Base:1:2:3:"),
            Err(GpsFormatError::MissingPrefix)
        );
        assert_eq!(
            GpsToken::parse_strict("GPS::1:2:3:"),
            Err(GpsFormatError::EmptyName)
        );
        assert!(matches!(
            GpsToken::parse_strict("GPS:Base:1:b:3:"),
            Err(GpsFormatError::Coordinate { axis: 'y', .. })
        ));
        assert!(matches!(
            GpsToken::parse_strict("GPS:Base:1:2:3:#XYZ:"),
            Err(GpsFormatError::Color(_))
        ));
    }
}
