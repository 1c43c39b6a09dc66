use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::navigation::gravity::gravity_radius;
use crate::{BodyKind, CelestialBody};

/// A body whose surface plus the ship margin touches a straight route.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Obstacle {
    pub name: String,
    pub kind: BodyKind,
    /// Closest approach of the route to the body's surface, metres.
    pub distance_from_surface: f64,
    pub safety_margin: f64,
    /// Surface radius plus margin.
    pub collision_radius: f64,
    /// Informational; flying through a gravity well is allowed.
    pub gravity_radius: f64,
    /// Position of the closest approach along the route, metres from start.
    pub along_route: f64,
}

/// Checks every body against the segment `start -> end`.
///
/// A body counts only when its centre projects onto the segment itself;
/// bodies behind either endpoint are ignored no matter how close they are
/// to the extended line. The result is ordered by position along the route.
pub fn detect_obstacles<'a, I>(start: DVec3, end: DVec3, bodies: I, safety_margin: f64) -> Vec<Obstacle>
where
    I: IntoIterator<Item = &'a CelestialBody>,
{
    let segment = end - start;
    let length = segment.length();
    let direction = segment.try_normalize().unwrap_or(DVec3::ZERO);

    let mut obstacles: Vec<Obstacle> = bodies
        .into_iter()
        .filter_map(|body| {
            let t = (body.position - start).dot(direction);
            if !(0.0..=length).contains(&t) {
                return None;
            }
            let closest = start + direction * t;
            let distance_to_center = closest.distance(body.position);
            let radius = body.radius_m();
            let collision_radius = radius + safety_margin;
            if distance_to_center >= collision_radius {
                return None;
            }
            Some(Obstacle {
                name: body.name.clone(),
                kind: body.kind,
                distance_from_surface: (distance_to_center - radius).max(0.0),
                safety_margin,
                collision_radius,
                gravity_radius: gravity_radius(body),
                along_route: t,
            })
        })
        .collect();

    obstacles.sort_by(|a, b| a.along_route.total_cmp(&b.along_route));
    obstacles
}
