use glam::DVec3;

use crate::{BodyKind, CelestialBody};

/// A danger zone at the origin with zero diameter has not been placed by
/// hand and gets sized from its contained bodies.
pub fn needs_auto_size(body: &CelestialBody) -> bool {
    body.kind == BodyKind::DangerZone
        && !body.contained_objects.is_empty()
        && body.position == DVec3::ZERO
        && body.diameter_km == 0.0
}

/// Centre and diameter (km) of a sphere enclosing `contained` plus a margin.
pub fn enclosing_sphere(contained: &[&CelestialBody], margin_km: f64) -> Option<(DVec3, f64)> {
    if contained.is_empty() {
        return None;
    }
    let centre = contained
        .iter()
        .fold(DVec3::ZERO, |acc, body| acc + body.position)
        / contained.len() as f64;
    let max_distance = contained
        .iter()
        .map(|body| body.position.distance(centre) + body.radius_m())
        .fold(0.0_f64, f64::max);
    let diameter_km = (max_distance + margin_km * 1000.0) * 2.0 / 1000.0;
    Some((centre, diameter_km))
}

/// Places and sizes every sentinel danger zone in `bodies`. Zones whose
/// contained names match nothing are left untouched.
///
/// Returns the number of zones resolved.
pub fn resolve_danger_zones(bodies: &mut [CelestialBody], default_margin_km: f64) -> usize {
    let mut updates = Vec::new();
    for (idx, zone) in bodies.iter().enumerate() {
        if !needs_auto_size(zone) {
            continue;
        }
        let contained: Vec<&CelestialBody> = bodies
            .iter()
            .filter(|body| zone.contained_objects.iter().any(|name| *name == body.name))
            .collect();
        let margin_km = zone
            .gravity_range_km
            .filter(|km| *km > 0.0)
            .unwrap_or(default_margin_km);
        match enclosing_sphere(&contained, margin_km) {
            Some(sphere) => updates.push((idx, sphere)),
            None => log::warn!(
                "danger zone {} lists no known bodies ({})",
                zone.name,
                zone.contained_objects.join(", ")
            ),
        }
    }

    for &(idx, (centre, diameter_km)) in &updates {
        let zone = &mut bodies[idx];
        zone.position = centre;
        zone.diameter_km = diameter_km;
        log::debug!(
            "danger zone {} sized to {:.1} km at {:?}",
            zone.name,
            diameter_km,
            centre
        );
    }
    updates.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn zone(contained: &[&str]) -> CelestialBody {
        let mut zone = CelestialBody::new("Zone", BodyKind::DangerZone, DVec3::ZERO, 0.0);
        zone.contained_objects = contained.iter().map(|s| s.to_string()).collect();
        zone
    }

    #[test]
    fn sentinel_zone_wraps_contained_bodies() {
        let mut bodies = vec![
            CelestialBody::new("A", BodyKind::Other, DVec3::ZERO, 10.0),
            CelestialBody::new("B", BodyKind::Other, DVec3::new(1000.0, 0.0, 0.0), 10.0),
            zone(&["A", "B"]),
        ];
        assert_eq!(resolve_danger_zones(&mut bodies, 50.0), 1);
        let zone = &bodies[2];
        assert_eq!(zone.position, DVec3::new(500.0, 0.0, 0.0));
        // (500 m + 5 km radius + 50 km margin) * 2
        assert_approx_eq!(zone.diameter_km, 111.0, 1e-9);
    }

    #[test]
    fn own_gravity_range_overrides_margin() {
        let mut z = zone(&["A"]);
        z.gravity_range_km = Some(10.0);
        let mut bodies = vec![CelestialBody::new("A", BodyKind::Other, DVec3::ONE, 0.0), z];
        resolve_danger_zones(&mut bodies, 50.0);
        assert_approx_eq!(bodies[1].diameter_km, 20.0, 1e-9);
        assert_eq!(bodies[1].position, DVec3::ONE);
    }

    #[test]
    fn hand_placed_zone_is_kept() {
        let mut z = zone(&["A"]);
        z.position = DVec3::new(5.0, 0.0, 0.0);
        let mut bodies = vec![CelestialBody::new("A", BodyKind::Other, DVec3::ZERO, 1.0), z];
        assert_eq!(resolve_danger_zones(&mut bodies, 50.0), 0);
        assert_eq!(bodies[1].diameter_km, 0.0);
    }

    #[test]
    fn unknown_members_leave_zone_alone() {
        let mut bodies = vec![zone(&["Ghost"])];
        assert_eq!(resolve_danger_zones(&mut bodies, 50.0), 0);
        assert_eq!(bodies[0].position, DVec3::ZERO);
    }
}
