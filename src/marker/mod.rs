pub mod camera;
pub mod controller;
pub mod manager;

pub use camera::{frame_route, resolve_jump, CameraFlight, CameraFraming, JumpRequest, JumpTarget};
pub use controller::{CameraMode, CoordinateController, MoveKeys};
pub use manager::{Marker, MarkerId, MarkerKind, MarkerManager};
