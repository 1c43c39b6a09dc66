use std::path::Path;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use starmap_navigator::catalog::loader::{load_catalog, FileFetcher};
use starmap_navigator::data::read_catalog_from_file;
use starmap_navigator::gps::{resolve_location, RoutePoint};
use starmap_navigator::layout::{layout_seeded, Layout2D, Viewport};
use starmap_navigator::navigation::obstacles::{detect_obstacles, Obstacle};
use starmap_navigator::navigation::route::{plan_route, RouteInputError, RouteSummary};
use starmap_navigator::{Catalog, NavConfig};

const CATALOG_ENV: &str = "STARMAP_CATALOG";

static CONFIG: Lazy<NavConfig> = Lazy::new(|| {
    NavConfig::from_env().unwrap_or_else(|err| {
        log::error!("invalid configuration, using defaults: {err}");
        NavConfig::default()
    })
});

static CATALOG: Lazy<Catalog> = Lazy::new(|| {
    let Ok(path) = std::env::var(CATALOG_ENV) else {
        log::warn!("{CATALOG_ENV} not set, serving an empty catalog");
        return Catalog::default();
    };
    let catalog = if Path::new(&path).extension().is_some_and(|ext| ext == "bin") {
        read_catalog_from_file(&path).unwrap_or_else(|err| {
            log::error!("failed to read snapshot {path}: {err}");
            Catalog::default()
        })
    } else {
        load_catalog(FileFetcher::new(&path), CONFIG.danger_zone_margin_km).catalog
    };
    log::info!("catalog ready: {} bodies from {path}", catalog.len());
    catalog
});

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NavRequest {
    Route {
        start: String,
        end: String,
    },
    Locate {
        token: String,
    },
    Layout {
        width: f64,
        height: f64,
        #[serde(default)]
        seed: u64,
    },
    Obstacles {
        start: String,
        end: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NavResponse {
    Route {
        route: RouteSummary,
        distance_km: f64,
        travel_minutes: f64,
    },
    Locate {
        point: RoutePoint,
    },
    Layout {
        layout: Layout2D,
    },
    Obstacles {
        obstacles: Vec<Obstacle>,
    },
    Error {
        message: String,
    },
}

fn respond(req: NavRequest, catalog: &Catalog, config: &NavConfig) -> NavResponse {
    match req {
        NavRequest::Route { start, end } => match plan_route(&start, &end, catalog, config) {
            Ok(route) => NavResponse::Route {
                distance_km: route.distance_km(),
                travel_minutes: route.travel_minutes(),
                route,
            },
            Err(err) => NavResponse::Error { message: err.to_string() },
        },
        NavRequest::Locate { token } => match resolve_location(&token, catalog) {
            Ok(point) => NavResponse::Locate { point },
            Err(err) => NavResponse::Error { message: err.to_string() },
        },
        NavRequest::Layout { width, height, seed } => {
            if !(width > 0.0 && height > 0.0) {
                return NavResponse::Error {
                    message: format!("invalid viewport {width}x{height}"),
                };
            }
            let layout = layout_seeded(catalog, Viewport::new(width, height), config, seed);
            NavResponse::Layout { layout }
        }
        NavRequest::Obstacles { start, end } => {
            let start = match resolve_location(&start, catalog) {
                Ok(point) => point,
                Err(err) => {
                    return NavResponse::Error {
                        message: RouteInputError::InvalidStart(err).to_string(),
                    }
                }
            };
            let end = match resolve_location(&end, catalog) {
                Ok(point) => point,
                Err(err) => {
                    return NavResponse::Error {
                        message: RouteInputError::InvalidEnd(err).to_string(),
                    }
                }
            };
            let obstacles =
                detect_obstacles(start.position, end.position, catalog, config.ship_safety_margin_m);
            NavResponse::Obstacles { obstacles }
        }
    }
}

async fn handler(event: LambdaEvent<NavRequest>) -> Result<NavResponse, Error> {
    Ok(respond(event.payload, &CATALOG, &CONFIG))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use starmap_navigator::{BodyKind, CelestialBody};

    fn catalog() -> Catalog {
        Catalog::new(vec![CelestialBody::new(
            "Ravok (Kepler-444c)",
            BodyKind::Planet,
            DVec3::new(1.0e6, 0.0, 0.0),
            6779.0,
        )])
    }

    fn ask(json: &str) -> NavResponse {
        let req: NavRequest = serde_json::from_str(json).unwrap();
        respond(req, &catalog(), &NavConfig::default())
    }

    #[test]
    fn route_request_reports_obstacles() {
        let resp = ask(r#"{"kind":"route","start":"-1000000,0,0","end":"3000000,0,0"}"#);
        let NavResponse::Route { route, distance_km, .. } = resp else {
            panic!("expected a route, got {resp:?}");
        };
        assert_eq!(distance_km, 4000.0);
        assert_eq!(route.obstacles.len(), 1);
    }

    #[test]
    fn bad_requests_become_error_responses() {
        assert!(matches!(
            ask(r#"{"kind":"locate","token":"nowhere"}"#),
            NavResponse::Error { .. }
        ));
        assert!(matches!(
            ask(r#"{"kind":"layout","width":0,"height":10}"#),
            NavResponse::Error { .. }
        ));
    }

    #[test]
    fn obstacle_errors_carry_the_parse_failure() {
        let NavResponse::Error { message } = ask(r#"{"kind":"obstacles","start":"Atlantis","end":"0,0,0"}"#) else {
            panic!("expected an error response");
        };
        assert_eq!(
            message,
            "route start: `Atlantis` is not a GPS token, X,Y,Z coordinates or a known object name"
        );

        let NavResponse::Error { message } = ask(r#"{"kind":"obstacles","start":"0,0,0","end":""}"#) else {
            panic!("expected an error response");
        };
        assert_eq!(message, "route end: location is empty");
    }

    #[test]
    fn layout_response_serializes_with_tag() {
        let resp = ask(r#"{"kind":"layout","width":800,"height":600}"#);
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["kind"], "layout");
        assert_eq!(value["layout"]["nodes"].as_array().unwrap().len(), 1);
    }
}
