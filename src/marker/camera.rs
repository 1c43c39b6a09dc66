//! Camera targets: jumping to a point, framing a route, and the eased
//! flight between two camera poses.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::gps::{parse_free_point, ParseError};

/// Distance the camera keeps from a jump target, metres.
pub const JUMP_VIEW_DISTANCE: f64 = 200_000.0;
pub const MIN_FRAMING_DISTANCE: f64 = 800_000.0;
pub const MAX_FRAMING_DISTANCE: f64 = 80_000_000.0;
pub const DEFAULT_FLIGHT_SECONDS: f64 = 1.6;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CameraFraming {
    pub center: DVec3,
    /// Camera distance from `center`.
    pub distance: f64,
    pub duration_s: f64,
}

/// Centres on the route midpoint, far enough back to see both ends.
pub fn frame_route(start: DVec3, end: DVec3) -> CameraFraming {
    let length = start.distance(end);
    CameraFraming {
        center: (start + end) / 2.0,
        distance: (length * 2.0).clamp(MIN_FRAMING_DISTANCE, MAX_FRAMING_DISTANCE),
        duration_s: (length / 50_000_000.0).clamp(1.5, 3.0),
    }
}

/// Camera position for looking at `target` from the current line of sight.
pub fn jump_camera(camera: DVec3, target: DVec3) -> DVec3 {
    let towards = (target - camera).try_normalize().unwrap_or(DVec3::NEG_Z);
    target - towards * JUMP_VIEW_DISTANCE
}

/// What the jump panel asked for.
#[derive(Clone, Debug, PartialEq)]
pub enum JumpRequest<'a> {
    /// A body picked from the object list.
    Body(&'a str),
    /// A typed GPS token or `x,y,z` triplet.
    Location(&'a str),
}

#[derive(Clone, Debug, PartialEq)]
pub struct JumpTarget {
    pub position: DVec3,
    pub label: String,
    /// Typed locations get a jump marker; catalog bodies are already drawn.
    pub place_marker: bool,
}

/// Resolves a jump request. Catalog bodies are centred exactly (no
/// safe-distance offset), unlike route endpoints.
pub fn resolve_jump(request: JumpRequest<'_>, catalog: &Catalog) -> Result<JumpTarget, ParseError> {
    match request {
        JumpRequest::Body(name) => catalog
            .get(name)
            .map(|body| JumpTarget {
                position: body.position,
                label: body.name.clone(),
                place_marker: false,
            })
            .ok_or_else(|| ParseError::Unresolved(name.to_string())),
        JumpRequest::Location(text) if text.trim().is_empty() => Err(ParseError::Empty),
        JumpRequest::Location(text) => parse_free_point(text)
            .map(|point| JumpTarget {
                position: point.position,
                label: point.name,
                place_marker: true,
            })
            .ok_or_else(|| ParseError::Unresolved(text.trim().to_string())),
    }
}

fn smooth_step(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Eased camera move; sample it every frame with the elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFlight {
    pub from_camera: DVec3,
    pub to_camera: DVec3,
    pub from_target: DVec3,
    pub to_target: DVec3,
    pub duration_s: f64,
}

impl CameraFlight {
    pub fn towards(camera: DVec3, look_at: DVec3, destination: DVec3, duration_s: f64) -> Self {
        CameraFlight {
            from_camera: camera,
            to_camera: jump_camera(camera, destination),
            from_target: look_at,
            to_target: destination,
            duration_s,
        }
    }

    /// Camera position and look-at target after `elapsed_s`.
    pub fn sample(&self, elapsed_s: f64) -> (DVec3, DVec3) {
        let t = if self.duration_s > 0.0 {
            smooth_step(elapsed_s / self.duration_s)
        } else {
            1.0
        };
        (
            self.from_camera.lerp(self.to_camera, t),
            self.from_target.lerp(self.to_target, t),
        )
    }

    pub fn is_finished(&self, elapsed_s: f64) -> bool {
        elapsed_s >= self.duration_s
    }
}
