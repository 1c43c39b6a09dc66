use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::csv::parse_decimal;
use crate::catalog::Catalog;
use crate::gps::token::GpsToken;
use crate::navigation::gravity::safe_distance;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("location is empty")]
    Empty,
    #[error("`{0}` is not a GPS token, X,Y,Z coordinates or a known object name")]
    Unresolved(String),
}

/// A resolved navigation point.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoutePoint {
    pub position: DVec3,
    pub name: String,
    /// Catalog body the point was derived from; only set for name lookups.
    pub origin: Option<String>,
}

impl RoutePoint {
    pub fn free(name: impl Into<String>, position: DVec3) -> Self {
        RoutePoint {
            position,
            name: name.into(),
            origin: None,
        }
    }
}

/// Parses `x,y,z` with exactly three finite components. Spaces inside
/// components are ignored.
pub fn parse_coordinate_triplet(input: &str) -> Option<DVec3> {
    let parts: Vec<&str> = input.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    let mut coords = [0.0; 3];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        let compact: String = part.chars().filter(|c| !c.is_whitespace()).collect();
        *slot = parse_decimal(&compact)?;
    }
    Some(DVec3::from_array(coords))
}

/// Resolves a GPS token or coordinate triplet, without catalog lookup.
pub fn parse_free_point(input: &str) -> Option<RoutePoint> {
    let value = input.trim();
    if let Some(token) = GpsToken::parse_lenient(value) {
        return Some(RoutePoint::free(token.name, token.position));
    }
    parse_coordinate_triplet(value).map(|position| RoutePoint::free("Coordinates", position))
}

/// Resolves a location typed by the user.
///
/// Tries, in order: a GPS token, an `x,y,z` triplet, and a case-insensitive
/// name fragment. A body found by name is not returned at its centre: the
/// point is pushed out along the body's direction from the system origin
/// by its safe distance (surface plus gravity well). Bodies at the origin
/// are pushed along +Z.
pub fn resolve_location(input: &str, catalog: &Catalog) -> Result<RoutePoint, ParseError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(ParseError::Empty);
    }
    if let Some(point) = parse_free_point(value) {
        return Ok(point);
    }

    let body = catalog
        .find_by_fragment(value)
        .ok_or_else(|| ParseError::Unresolved(value.to_string()))?;
    let direction = body.position.try_normalize().unwrap_or(DVec3::Z);
    Ok(RoutePoint {
        position: body.position + direction * safe_distance(body),
        name: format!("{} (safe distance)", body.name),
        origin: Some(body.name.clone()),
    })
}
