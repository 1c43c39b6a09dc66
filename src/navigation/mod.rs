pub mod gravity;
pub mod obstacles;
pub mod route;

pub use gravity::{gravity_radius, safe_distance};
pub use obstacles::{detect_obstacles, Obstacle};
pub use route::{plan_route, RouteInputError, RoutePlanner, RouteSummary};
