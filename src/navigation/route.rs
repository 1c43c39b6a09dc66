use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::NavConfig;
use crate::gps::token::{GpsColor, GpsToken};
use crate::gps::{resolve_location, ParseError, RoutePoint};
use crate::marker::camera::{frame_route, CameraFraming};
use crate::navigation::obstacles::{detect_obstacles, Obstacle};

/// Colour the game uses for route waypoints.
pub const ROUTE_GPS_COLOR: GpsColor = GpsColor::Argb(0xFF75C9F1);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RouteInputError {
    #[error("route start is missing")]
    MissingStart,
    #[error("route end is missing")]
    MissingEnd,
    #[error("route start: {0}")]
    InvalidStart(#[source] ParseError),
    #[error("route end: {0}")]
    InvalidEnd(#[source] ParseError),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RouteSummary {
    pub start: RoutePoint,
    pub end: RoutePoint,
    /// Straight-line distance, metres.
    pub distance: f64,
    /// Travel time at the nominal speed, seconds.
    pub travel_time: f64,
    pub obstacles: Vec<Obstacle>,
    pub start_gps: String,
    pub end_gps: String,
}

impl RouteSummary {
    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }

    pub fn travel_minutes(&self) -> f64 {
        self.travel_time / 60.0
    }

    pub fn is_clear(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn framing(&self) -> CameraFraming {
        frame_route(self.start.position, self.end.position)
    }
}

/// Waypoint token for the game, e.g. `GPS:START Home:1.00:2.00:3.00:#FF75C9F1:`.
pub fn waypoint_gps(label: &str, point: &RoutePoint) -> String {
    GpsToken::new(format!("{label} {}", point.name), point.position)
        .with_color(ROUTE_GPS_COLOR)
        .format_fixed(2)
}

/// Plans a straight route between two typed locations. Pure: the catalog
/// is only read, and equal inputs give equal summaries.
pub fn plan_route(
    start_token: &str,
    end_token: &str,
    catalog: &Catalog,
    config: &NavConfig,
) -> Result<RouteSummary, RouteInputError> {
    if start_token.trim().is_empty() {
        return Err(RouteInputError::MissingStart);
    }
    if end_token.trim().is_empty() {
        return Err(RouteInputError::MissingEnd);
    }
    let start = resolve_location(start_token, catalog).map_err(RouteInputError::InvalidStart)?;
    let end = resolve_location(end_token, catalog).map_err(RouteInputError::InvalidEnd)?;
    Ok(summarize(start, end, catalog, config))
}

/// Builds the summary for two already resolved points.
pub fn summarize(
    start: RoutePoint,
    end: RoutePoint,
    catalog: &Catalog,
    config: &NavConfig,
) -> RouteSummary {
    let distance = start.position.distance(end.position);
    let travel_time = if config.nominal_speed_mps > 0.0 {
        distance / config.nominal_speed_mps
    } else {
        f64::INFINITY
    };
    let obstacles = detect_obstacles(
        start.position,
        end.position,
        catalog,
        config.ship_safety_margin_m,
    );
    log::debug!(
        "route {} -> {}: {:.1} km, {} obstacles",
        start.name,
        end.name,
        distance / 1000.0,
        obstacles.len()
    );
    RouteSummary {
        start_gps: waypoint_gps("START", &start),
        end_gps: waypoint_gps("END", &end),
        start,
        end,
        distance,
        travel_time,
        obstacles,
    }
}

/// Route currently shown on the map.
#[derive(Clone, Debug, Default)]
pub struct RoutePlanner {
    current: Option<RouteSummary>,
}

impl RoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&RouteSummary> {
        self.current.as_ref()
    }

    /// Plans and stores a route. On error the previous route stays.
    pub fn calculate(
        &mut self,
        start_token: &str,
        end_token: &str,
        catalog: &Catalog,
        config: &NavConfig,
    ) -> Result<&RouteSummary, RouteInputError> {
        let summary = plan_route(start_token, end_token, catalog, config)?;
        Ok(self.current.insert(summary))
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn midpoint(&self) -> Option<DVec3> {
        self.current
            .as_ref()
            .map(|route| (route.start.position + route.end.position) / 2.0)
    }
}
