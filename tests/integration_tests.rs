use std::fs;

use assert_approx_eq::assert_approx_eq;
use glam::DVec3;
use starmap_navigator::catalog::loader::{load_catalog, FileFetcher, LoadState};
use starmap_navigator::catalog::user_data::UserDataStore;
use starmap_navigator::data::{read_catalog_from_file, write_catalog_to_file};
use starmap_navigator::gps::{resolve_location, GpsToken};
use starmap_navigator::layout::{layout_seeded, View2d, Viewport};
use starmap_navigator::marker::{frame_route, MarkerKind};
use starmap_navigator::navigation::{gravity_radius, plan_route, safe_distance};
use starmap_navigator::{BodyKind, Catalog, NavConfig, Session};

const CATALOG_CSV: &str = "\u{feff}name;type;objectType;x;y;z;diameter;color;gravityRange;containedObjects;description;resources;poeticDescription\r\n\
Navia (Kepler-444b);Planeta;planet;0;0;0;12742;0x66cc66;;;Home world;Fe, Si;\r\n\
Elyra (Kepler-444b-1);Księżyc;moon;400000000;0;0;3474;#cccccc;;;;;\r\n\
Ravok (Kepler-444c);Planeta;planet;-900000000;0;0;6779;;;;;;\r\n\
Pertam (Kepler-444e);Planeta;planet;0;0;2000000000;4879;;;;;;\r\n\
A;Asteroida;asteroid;0;0;0;10;;;;;;\r\n\
B;Asteroida;asteroid;1000;0;0;10;;;;;;\r\n\
Pas;Strefa;danger_zone;0;0;0;0;#ff0000;;A, B;\"Debris; keep out\";;\r\n\
Gate;Tunel;wormhole;5000000000;0;0;1;;;;;;\r\n\
Broken;Planeta;planet;nope;0;0;1;;;;;;\r\n";

fn load_fixture() -> Catalog {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.csv");
    fs::write(&path, CATALOG_CSV).unwrap();
    let outcome = load_catalog(FileFetcher::new(&path), NavConfig::default().danger_zone_margin_km);
    assert_eq!(outcome.state, LoadState::Loaded);
    assert_eq!(outcome.row_errors.len(), 1);
    assert_eq!(outcome.row_errors[0].line, 10);
    outcome.catalog
}

#[test]
fn catalog_loads_and_sizes_danger_zone() {
    let catalog = load_fixture();
    assert_eq!(catalog.len(), 8);

    let zone = catalog.get("Pas").unwrap();
    assert_eq!(zone.position, DVec3::new(500.0, 0.0, 0.0));
    assert_approx_eq!(zone.diameter_km, 111.0, 1e-9);
    assert_eq!(zone.description, "Debris; keep out");
    assert_eq!(gravity_radius(zone), 0.0);

    assert_eq!(catalog.get("A").unwrap().kind, BodyKind::Other);
    assert!(catalog.iter().all(|body| gravity_radius(body) >= 0.0));
}

#[test]
fn missing_catalog_file_fails_softly() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = load_catalog(FileFetcher::new(dir.path().join("absent.csv")), 50.0);
    assert_eq!(outcome.state, LoadState::Failed);
    assert!(outcome.catalog.is_empty());
    assert_eq!(outcome.fetch_errors.len(), 2);
}

#[test]
fn gps_token_parses_and_reformats() {
    let token = GpsToken::parse_lenient("GPS:Home:1000:2000:3000:#FF0000:").unwrap();
    assert_eq!(token.name, "Home");
    assert_eq!(token.position, DVec3::new(1000.0, 2000.0, 3000.0));

    let reparsed = GpsToken::parse_lenient(&token.to_string()).unwrap();
    assert_approx_eq!(reparsed.position.x, token.position.x, 1e-6);
    assert_approx_eq!(reparsed.position.y, token.position.y, 1e-6);
    assert_approx_eq!(reparsed.position.z, token.position.z, 1e-6);
}

#[test]
fn named_locations_sit_at_safe_distance() {
    let catalog = load_fixture();
    for name in ["Navia", "Ravok", "Elyra", "Gate"] {
        let point = resolve_location(name, &catalog).unwrap();
        let body = catalog.get(point.origin.as_deref().unwrap()).unwrap();
        assert_ne!(point.position, body.position);
        assert_approx_eq!(body.distance_to_point(point.position), safe_distance(body), 1e-3);
    }
}

#[test]
fn route_ending_at_navia_safe_point_is_clear() {
    let catalog = load_fixture();
    let route = plan_route("0,0,50000000", "Navia", &catalog, &NavConfig::default()).unwrap();
    assert!(route.obstacles.iter().all(|o| o.name != "Navia (Kepler-444b)"));
    assert_approx_eq!(route.end.position.z, 6_371_000.0 + 40_000.0, 1e-6);
    assert_approx_eq!(route.travel_time, route.distance / 100.0, 1e-9);
    assert!(route.start_gps.starts_with("GPS:START Coordinates:"));
}

#[test]
fn route_through_a_planet_is_flagged() {
    let catalog = load_fixture();
    let route = plan_route(
        "GPS:West:-20000000:0:0:",
        "GPS:East:20000000:0:0:",
        &catalog,
        &NavConfig::default(),
    )
    .unwrap();
    let names: Vec<&str> = route.obstacles.iter().map(|o| o.name.as_str()).collect();
    // ties on the along-route position keep catalog order
    assert_eq!(names, ["Navia (Kepler-444b)", "A", "Pas", "B"]);

    let framing = frame_route(route.start.position, route.end.position);
    assert_eq!(framing.center, DVec3::ZERO);
    assert_approx_eq!(framing.distance, 80_000_000.0, 1e-6);
}

#[test]
fn layout_separates_planets_and_keeps_moons_on_orbit() {
    let catalog = load_fixture();
    let layout = layout_seeded(&catalog, Viewport::new(1200.0, 900.0), &NavConfig::default(), 11);
    assert_eq!(layout.nodes.len(), catalog.len());

    let navia = layout.get("Navia (Kepler-444b)").unwrap();
    let ravok = layout.get("Ravok (Kepler-444c)").unwrap();
    assert_ne!(navia.position, ravok.position);

    let elyra = layout.get("Elyra (Kepler-444b-1)").unwrap();
    assert_approx_eq!(elyra.position.distance(navia.position), 60.0 * 0.8, 1e-9);

    let view = View2d::default();
    let picked = view.pick(&layout, navia.position).unwrap();
    assert_eq!(picked.name, "Navia (Kepler-444b)");
}

#[test]
fn snapshot_round_trip_keeps_lookups() {
    let catalog = load_fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.bin");
    write_catalog_to_file(&catalog, &path).unwrap();
    let restored = read_catalog_from_file(&path).unwrap();
    assert_eq!(restored.len(), catalog.len());
    assert_eq!(restored.get("Pas").unwrap().diameter_km, catalog.get("Pas").unwrap().diameter_km);
}

#[test]
fn session_with_user_data_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("user.json");

    let mut session = Session::new(load_fixture(), UserDataStore::new(), NavConfig::default());
    let import = session
        .add_user_csv("name;seGPS\nMining Base;GPS:Mining Base:0:0:-30000000:#FFAA00:\n", "bases.csv")
        .unwrap();
    assert_eq!(import.added, 1);

    let route = session.calculate_route("Mining Base", "Navia").unwrap();
    assert_eq!(route.start.origin.as_deref(), Some("Mining Base"));
    assert_eq!(session.markers().by_kind(MarkerKind::Route).count(), 2);

    session.user_data().save(&store_path).unwrap();
    let restored = UserDataStore::load(&store_path).unwrap();
    let session = Session::new(load_fixture(), restored, NavConfig::default());
    let base = session.catalog().get("Mining Base").unwrap();
    assert!(base.is_user_supplied);
    assert_approx_eq!(base.diameter_km, 2.0, 1e-12);
    assert!(session.route().is_none());
}
