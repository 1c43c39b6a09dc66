//! A free-moving coordinate marker steered with the keyboard, used to read
//! off or hand out GPS positions anywhere in space.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gps::token::{GpsColor, GpsToken, GPS_PREFIX};
use crate::marker::manager::{MarkerId, MarkerKind, MarkerManager};

/// Selectable movement speeds, m/s.
pub const SPEEDS: [f64; 6] = [1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0];
pub const DEFAULT_SPEED_INDEX: usize = 2;
pub const CONTROLLER_LABEL: &str = "Punkt Kontrolny";
/// Frames slower than this are treated as a pause and not integrated.
const MAX_STEP_SECONDS: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Camera target tracks the marker every frame.
    Follow,
    #[default]
    Free,
    /// Camera jumps to the marker whenever it is edited.
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveKeys {
    /// Maps the W/S/A/D/Space/C layout.
    pub fn from_pressed(pressed: &[char]) -> Self {
        let has = |key: char| pressed.iter().any(|p| p.eq_ignore_ascii_case(&key));
        MoveKeys {
            forward: has('w'),
            back: has('s'),
            left: has('a'),
            right: has('d'),
            up: has(' '),
            down: has('c'),
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right || self.up || self.down
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasteError {
    #[error("clipboard holds no GPS data")]
    NoGpsData,
    #[error("clipboard GPS token is malformed")]
    InvalidToken,
}

#[derive(Clone, Debug)]
pub struct CoordinateController {
    position: DVec3,
    speed_index: usize,
    camera_mode: CameraMode,
    marker: Option<MarkerId>,
}

impl Default for CoordinateController {
    fn default() -> Self {
        CoordinateController {
            position: DVec3::ZERO,
            speed_index: DEFAULT_SPEED_INDEX,
            camera_mode: CameraMode::Free,
            marker: None,
        }
    }
}

impl CoordinateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.marker.is_some()
    }

    pub fn speed(&self) -> f64 {
        SPEEDS[self.speed_index]
    }

    /// Out-of-range indices are ignored.
    pub fn set_speed_index(&mut self, index: usize) {
        if index < SPEEDS.len() {
            self.speed_index = index;
        }
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.camera_mode
    }

    /// Returns a camera destination when switching into center mode.
    pub fn set_camera_mode(&mut self, mode: CameraMode) -> Option<DVec3> {
        self.camera_mode = mode;
        self.center_request()
    }

    /// Places the persistent controller marker.
    pub fn activate(&mut self, markers: &mut MarkerManager) {
        if let Some(old) = self.marker.take() {
            markers.remove(old);
        }
        self.marker = Some(markers.add(MarkerKind::Controller, CONTROLLER_LABEL, self.position, true));
        log::info!("coordinate controller active at {:?}", self.position);
    }

    pub fn deactivate(&mut self, markers: &mut MarkerManager) {
        if let Some(id) = self.marker.take() {
            markers.remove(id);
            log::info!("coordinate controller off");
        }
    }

    pub fn toggle(&mut self, markers: &mut MarkerManager) {
        if self.is_active() {
            self.deactivate(markers);
        } else {
            self.activate(markers);
        }
    }

    /// Integrates one frame of keyboard movement. Horizontal keys move in
    /// the XZ plane relative to the camera; up/down move along world Y.
    ///
    /// Returns whether the marker moved.
    pub fn step(
        &mut self,
        dt: f64,
        keys: MoveKeys,
        camera_forward: DVec3,
        camera_up: DVec3,
        markers: &mut MarkerManager,
    ) -> bool {
        if !self.is_active() || dt <= 0.0 || dt > MAX_STEP_SECONDS || !keys.any() {
            return false;
        }
        let distance = self.speed() * dt;
        let right = camera_forward.cross(camera_up).normalize_or_zero();
        let flat_forward = DVec3::new(camera_forward.x, 0.0, camera_forward.z);
        let flat_right = DVec3::new(right.x, 0.0, right.z);

        let mut delta = DVec3::ZERO;
        if keys.forward {
            delta += flat_forward;
        }
        if keys.back {
            delta -= flat_forward;
        }
        if keys.right {
            delta += flat_right;
        }
        if keys.left {
            delta -= flat_right;
        }
        if keys.up {
            delta += DVec3::Y;
        }
        if keys.down {
            delta -= DVec3::Y;
        }

        self.position += delta * distance;
        self.sync_marker(markers);
        true
    }

    /// Sets one coordinate from the input fields.
    pub fn set_axis(&mut self, axis: Axis, value: f64, markers: &mut MarkerManager) -> Option<DVec3> {
        match axis {
            Axis::X => self.position.x = value,
            Axis::Y => self.position.y = value,
            Axis::Z => self.position.z = value,
        }
        self.sync_marker(markers);
        self.center_request()
    }

    pub fn reset(&mut self, markers: &mut MarkerManager) -> Option<DVec3> {
        self.position = DVec3::ZERO;
        self.sync_marker(markers);
        self.center_request()
    }

    /// Where the camera should look this frame, in follow mode.
    pub fn camera_target(&self) -> Option<DVec3> {
        (self.is_active() && self.camera_mode == CameraMode::Follow).then_some(self.position)
    }

    pub fn copy_gps(&self) -> String {
        GpsToken::new(CONTROLLER_LABEL, self.position)
            .with_color(GpsColor::Rgb(0xFF_FF_FF))
            .format_fixed(2)
    }

    /// Moves the marker to the first GPS token found in `text`.
    ///
    /// Returns the token's name.
    pub fn paste_gps(&mut self, text: &str, markers: &mut MarkerManager) -> Result<String, PasteError> {
        let start = text.find(GPS_PREFIX).ok_or(PasteError::NoGpsData)?;
        let candidate = text[start..].lines().next().unwrap_or_default();
        let token = GpsToken::parse_lenient(candidate).ok_or(PasteError::InvalidToken)?;
        self.position = token.position;
        self.sync_marker(markers);
        log::info!("controller moved to pasted GPS {}", token.name);
        Ok(token.name)
    }

    fn sync_marker(&self, markers: &mut MarkerManager) {
        if let Some(marker) = self.marker.and_then(|id| markers.get_mut(id)) {
            marker.position = self.position;
        }
    }

    fn center_request(&self) -> Option<DVec3> {
        (self.is_active() && self.camera_mode == CameraMode::Center).then_some(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn active() -> (CoordinateController, MarkerManager) {
        let mut markers = MarkerManager::default();
        let mut ctl = CoordinateController::new();
        ctl.activate(&mut markers);
        (ctl, markers)
    }

    #[test]
    fn activation_places_persistent_marker() {
        let (mut ctl, mut markers) = active();
        assert_eq!(markers.len(), 1);
        assert!(markers.all()[0].persistent);
        ctl.toggle(&mut markers);
        assert!(!ctl.is_active());
        assert!(markers.is_empty());
    }

    #[test]
    fn forward_moves_along_flat_camera_direction() {
        let (mut ctl, mut markers) = active();
        let keys = MoveKeys::from_pressed(&['W']);
        let moved = ctl.step(0.05, keys, DVec3::new(0.0, -1.0, -1.0).normalize(), DVec3::Y, &mut markers);
        assert!(moved);
        // 100 m/s for 0.05 s, along the XZ part of the view direction
        assert_approx_eq!(ctl.position().z, -5.0 * std::f64::consts::FRAC_1_SQRT_2, 1e-9);
        assert_eq!(ctl.position().y, 0.0);
        assert_eq!(markers.all()[0].position, ctl.position());
    }

    #[test]
    fn vertical_keys_and_long_frames() {
        let (mut ctl, mut markers) = active();
        ctl.set_speed_index(3);
        let up = MoveKeys::from_pressed(&[' ']);
        assert!(ctl.step(0.1, up, DVec3::NEG_Z, DVec3::Y, &mut markers));
        assert_approx_eq!(ctl.position().y, 100.0, 1e-9);
        assert!(!ctl.step(0.5, up, DVec3::NEG_Z, DVec3::Y, &mut markers));
        assert_approx_eq!(ctl.position().y, 100.0, 1e-9);
    }

    #[test]
    fn strafing_uses_camera_right() {
        let (mut ctl, mut markers) = active();
        let keys = MoveKeys::from_pressed(&['d']);
        ctl.step(0.1, keys, DVec3::NEG_Z, DVec3::Y, &mut markers);
        // -Z x Y = +X
        assert_approx_eq!(ctl.position().x, 10.0, 1e-9);
    }

    #[test]
    fn inactive_controller_does_not_move() {
        let mut markers = MarkerManager::default();
        let mut ctl = CoordinateController::new();
        let keys = MoveKeys::from_pressed(&['w']);
        assert!(!ctl.step(0.05, keys, DVec3::NEG_Z, DVec3::Y, &mut markers));
    }

    #[test]
    fn center_mode_requests_camera_jumps() {
        let (mut ctl, mut markers) = active();
        assert_eq!(ctl.set_axis(Axis::X, 5.0, &mut markers), None);
        assert_eq!(ctl.set_camera_mode(CameraMode::Center), Some(DVec3::new(5.0, 0.0, 0.0)));
        assert_eq!(ctl.reset(&mut markers), Some(DVec3::ZERO));
        ctl.set_camera_mode(CameraMode::Follow);
        assert_eq!(ctl.camera_target(), Some(DVec3::ZERO));
    }

    #[test]
    fn gps_copy_and_paste() {
        let (mut ctl, mut markers) = active();
        ctl.set_axis(Axis::Y, 12.346, &mut markers);
        assert_eq!(ctl.copy_gps(), "GPS:Punkt Kontrolny:0.00:12.35:0.00:#FFFFFF:");

        let name = ctl
            .paste_gps("look at GPS:Depot:1:2:3:#FF0000: please", &mut markers)
            .unwrap();
        assert_eq!(name, "Depot");
        assert_eq!(ctl.position(), DVec3::new(1.0, 2.0, 3.0));

        assert_eq!(ctl.paste_gps("nothing here", &mut markers), Err(PasteError::NoGpsData));
        assert_eq!(ctl.paste_gps("GPS:x:1:y:3:", &mut markers), Err(PasteError::InvalidToken));
    }
}
