use crate::{BodyKind, CelestialBody};

pub const PLANET_GRAVITY_M: f64 = 40_000.0;
pub const MOON_GRAVITY_M: f64 = 20_000.0;
pub const DEFAULT_GRAVITY_M: f64 = 10_000.0;

/// Reach of a body's gravity well in metres.
///
/// Danger zones are visual only and never pull; for them a declared
/// `gravityRange` is the auto-size margin instead. Otherwise a declared
/// range (km) wins over the per-kind default.
pub fn gravity_radius(body: &CelestialBody) -> f64 {
    if body.kind == BodyKind::DangerZone {
        return 0.0;
    }
    if let Some(km) = body.gravity_range_km.filter(|km| km.is_finite() && *km >= 0.0) {
        return km * 1000.0;
    }
    match body.kind {
        BodyKind::Planet => PLANET_GRAVITY_M,
        BodyKind::Moon => MOON_GRAVITY_M,
        _ => DEFAULT_GRAVITY_M,
    }
}

/// Distance from a body's centre at which a ship is clear of both its
/// surface and its gravity well.
pub fn safe_distance(body: &CelestialBody) -> f64 {
    body.radius_m() + gravity_radius(body)
}
