//! Schematic 2D system map.
//!
//! This is a layout for legibility, not orbital mechanics: known planets sit
//! alternately left and right of the centre on their tabulated orbits, moons
//! alternately above and below their planet, and everything else on a ring
//! outside the outermost planet orbit.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::NavConfig;
use crate::layout::tables::{moon_orbit, planet_orbit, PlanetType};
use crate::{BodyKind, CelestialBody};

pub const MIN_DISPLAY_RADIUS: f64 = 4.0;
pub const MAX_DISPLAY_RADIUS: f64 = 30.0;

/// Spread of the random placement for planets missing from the tables.
const UNKNOWN_PLANET_SPREAD: f64 = 400.0;
/// Offset used for moons when there is no planet at all.
const ORPHAN_MOON_OFFSET: DVec2 = DVec2::new(300.0, 150.0);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LayoutLevel {
    Planet = 0,
    Moon = 1,
    Other = 2,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Layout2DNode {
    pub name: String,
    pub kind: BodyKind,
    pub position: DVec2,
    pub level: LayoutLevel,
    pub display_radius: f64,
    /// Parent planet, for moons.
    pub parent: Option<String>,
    /// Orbit around the system centre (planets) or the parent (moons);
    /// absent for fallback placements.
    pub orbit_radius: Option<f64>,
    pub orbit_angle: Option<f64>,
    pub planet_type: Option<PlanetType>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Layout2D {
    pub center: DVec2,
    /// Nodes ordered by the body's distance from the system origin.
    pub nodes: Vec<Layout2DNode>,
}

impl Layout2D {
    pub fn get(&self, name: &str) -> Option<&Layout2DNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn max_planet_orbit(&self) -> f64 {
        self.nodes
            .iter()
            .filter(|node| node.level == LayoutLevel::Planet)
            .filter_map(|node| node.orbit_radius)
            .fold(0.0, f64::max)
    }
}

/// On-screen radius: logarithmic in the diameter so asteroids and gas
/// giants both stay readable.
pub fn display_radius(diameter_km: f64) -> f64 {
    if diameter_km <= 0.0 {
        return MIN_DISPLAY_RADIUS;
    }
    ((diameter_km + 1.0).ln() * 3.0).clamp(MIN_DISPLAY_RADIUS, MAX_DISPLAY_RADIUS)
}

/// Layout with a fixed seed, for reproducible output.
pub fn layout_seeded(catalog: &Catalog, viewport: Viewport, config: &NavConfig, seed: u64) -> Layout2D {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    layout_2d(catalog, viewport, config, &mut rng)
}

/// Lays out the whole catalog. Only bodies missing from the placement
/// tables draw from `rng`.
pub fn layout_2d<R: Rng + ?Sized>(
    catalog: &Catalog,
    viewport: Viewport,
    config: &NavConfig,
    rng: &mut R,
) -> Layout2D {
    let center = viewport.center();

    // catalog index paired with the body; names are not assumed unique here
    let mut ordered: Vec<(usize, &CelestialBody)> = catalog.iter().enumerate().collect();
    ordered.sort_by(|a, b| a.1.position.length().total_cmp(&b.1.position.length()));

    let planets = of_kind(&ordered, |kind| kind == BodyKind::Planet);
    let moons = of_kind(&ordered, |kind| kind == BodyKind::Moon);
    let others = of_kind(&ordered, |kind| !matches!(kind, BodyKind::Planet | BodyKind::Moon));

    let mut placed: HashMap<usize, Layout2DNode> = HashMap::with_capacity(ordered.len());
    let mut planet_slots: HashMap<&str, usize> = HashMap::with_capacity(planets.len());

    for (index, &(slot, planet)) in planets.iter().enumerate() {
        let mut node = base_node(planet, LayoutLevel::Planet);
        match planet_orbit(&planet.name) {
            Some(orbit) => {
                let radius = orbit.orbit_distance * config.orbit_scale_px;
                let angle = if index % 2 == 0 { 0.0 } else { PI };
                node.position = center + DVec2::from_angle(angle) * radius;
                node.orbit_radius = Some(radius);
                node.orbit_angle = Some(angle);
                node.planet_type = Some(orbit.planet_type);
            }
            None => {
                let jitter = DVec2::new(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5);
                node.position = center + jitter * UNKNOWN_PLANET_SPREAD;
                log::debug!("planet {} has no orbit entry, placed at random", planet.name);
            }
        }
        planet_slots.entry(planet.name.as_str()).or_insert(slot);
        placed.insert(slot, node);
    }

    // position of each moon among the tabulated moons of its parent
    let mut siblings_seen: HashMap<&str, usize> = HashMap::new();
    for &(slot, moon) in &moons {
        let mut node = base_node(moon, LayoutLevel::Moon);
        let tabulated = moon_orbit(&moon.name).and_then(|orbit| {
            let parent = placed.get(planet_slots.get(orbit.parent)?)?;
            Some((orbit, parent.position))
        });

        match tabulated {
            Some((orbit, parent_position)) => {
                let sibling = siblings_seen.entry(orbit.parent).or_insert(0);
                let angle = if *sibling % 2 == 0 { FRAC_PI_2 } else { 3.0 * FRAC_PI_2 };
                *sibling += 1;
                let radius = orbit.moon_distance * config.moon_orbit_scale;
                node.position = parent_position + DVec2::from_angle(angle) * radius;
                node.parent = Some(orbit.parent.to_string());
                node.orbit_radius = Some(radius);
                node.orbit_angle = Some(angle);
            }
            None => match nearest_planet(moon, &planets)
                .and_then(|(parent_slot, parent)| Some((parent, placed.get(&parent_slot)?.position)))
            {
                Some((parent, parent_position)) => {
                    let offset = DVec2::new(
                        (rng.random::<f64>() - 0.5) * 100.0,
                        80.0 + rng.random::<f64>() * 40.0,
                    );
                    node.position = parent_position + offset;
                    node.parent = Some(parent.name.clone());
                }
                None => node.position = center + ORPHAN_MOON_OFFSET,
            },
        }
        placed.insert(slot, node);
    }

    let outermost = planets
        .iter()
        .filter_map(|(slot, _)| placed.get(slot))
        .filter_map(|node| node.orbit_radius)
        .fold(0.0, f64::max);
    let ring_radius = config
        .ring_min_radius_px
        .max(outermost + config.ring_margin_px);
    let step = if others.is_empty() {
        0.0
    } else {
        TAU / others.len() as f64
    };
    for (index, &(slot, other)) in others.iter().enumerate() {
        let mut node = base_node(other, LayoutLevel::Other);
        node.position = center + DVec2::from_angle(step * index as f64) * ring_radius;
        placed.insert(slot, node);
    }

    let nodes = ordered
        .iter()
        .filter_map(|(slot, _)| placed.remove(slot))
        .collect();
    Layout2D { center, nodes }
}

fn base_node(body: &CelestialBody, level: LayoutLevel) -> Layout2DNode {
    Layout2DNode {
        name: body.name.clone(),
        kind: body.kind,
        position: DVec2::ZERO,
        level,
        display_radius: display_radius(body.diameter_km),
        parent: None,
        orbit_radius: None,
        orbit_angle: None,
        planet_type: None,
    }
}

fn of_kind<'a>(
    ordered: &[(usize, &'a CelestialBody)],
    keep: impl Fn(BodyKind) -> bool,
) -> Vec<(usize, &'a CelestialBody)> {
    ordered
        .iter()
        .copied()
        .filter(|(_, body)| keep(body.kind))
        .collect()
}

fn nearest_planet<'a>(
    moon: &CelestialBody,
    planets: &[(usize, &'a CelestialBody)],
) -> Option<(usize, &'a CelestialBody)> {
    planets
        .iter()
        .copied()
        .min_by(|a, b| moon.distance(a.1).total_cmp(&moon.distance(b.1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use glam::DVec3;

    const VIEW: Viewport = Viewport { width: 1000.0, height: 800.0 };

    fn body(name: &str, kind: BodyKind, x: f64, diameter_km: f64) -> CelestialBody {
        CelestialBody::new(name, kind, DVec3::new(x, 0.0, 0.0), diameter_km)
    }

    fn home_system() -> Catalog {
        Catalog::new(vec![
            body("Navia (Kepler-444b)", BodyKind::Planet, 1.0e6, 12742.0),
            body("Ravok (Kepler-444c)", BodyKind::Planet, 2.0e6, 6779.0),
            body("Pertam (Kepler-444e)", BodyKind::Planet, 3.0e6, 4879.0),
            body("Elyra (Kepler-444b-1)", BodyKind::Moon, 1.1e6, 3474.0),
            body("Torvion (Kepler-444e-1)", BodyKind::Moon, 3.1e6, 2634.0),
            body("Phrygia (Kepler-444e-2)", BodyKind::Moon, 3.2e6, 1436.0),
            body("Gate", BodyKind::Wormhole, 5.0e6, 1.0),
            body("Base", BodyKind::UserObject, 6.0e6, 2.0),
        ])
    }

    #[test]
    fn display_radius_is_clamped_log() {
        assert_eq!(display_radius(0.0), MIN_DISPLAY_RADIUS);
        assert_eq!(display_radius(1.0), MIN_DISPLAY_RADIUS);
        assert_approx_eq!(display_radius(100.0), (101.0f64).ln() * 3.0, 1e-12);
        assert_eq!(display_radius(1.0e9), MAX_DISPLAY_RADIUS);
    }

    #[test]
    fn planets_alternate_sides() {
        let layout = layout_seeded(&home_system(), VIEW, &NavConfig::default(), 7);
        let navia = layout.get("Navia (Kepler-444b)").unwrap();
        let ravok = layout.get("Ravok (Kepler-444c)").unwrap();
        let pertam = layout.get("Pertam (Kepler-444e)").unwrap();
        assert_approx_eq!(navia.position.x, 500.0 + 0.4 * 120.0, 1e-9);
        assert_approx_eq!(ravok.position.x, 500.0 - 0.8 * 120.0, 1e-9);
        assert_approx_eq!(pertam.position.x, 500.0 + 2.2 * 120.0, 1e-9);
        assert_approx_eq!(navia.position.y, 400.0, 1e-9);
        assert_ne!(navia.position, ravok.position);
        assert_eq!(ravok.planet_type, Some(PlanetType::Terrestrial));
    }

    #[test]
    fn moons_sit_on_their_scaled_orbit() {
        let layout = layout_seeded(&home_system(), VIEW, &NavConfig::default(), 7);
        let pertam = layout.get("Pertam (Kepler-444e)").unwrap().position;
        let torvion = layout.get("Torvion (Kepler-444e-1)").unwrap();
        let phrygia = layout.get("Phrygia (Kepler-444e-2)").unwrap();
        assert_approx_eq!(torvion.position.distance(pertam), 35.0 * 0.8, 1e-9);
        assert_approx_eq!(phrygia.position.distance(pertam), 50.0 * 0.8, 1e-9);
        // first sibling below, second above
        assert!(torvion.position.y > pertam.y);
        assert!(phrygia.position.y < pertam.y);
        assert_eq!(torvion.parent.as_deref(), Some("Pertam (Kepler-444e)"));
    }

    #[test]
    fn others_ring_outside_planets() {
        let layout = layout_seeded(&home_system(), VIEW, &NavConfig::default(), 7);
        let ring = 400.0_f64.max(2.2 * 120.0 + 100.0);
        for name in ["Gate", "Base"] {
            let node = layout.get(name).unwrap();
            assert_eq!(node.level, LayoutLevel::Other);
            assert_approx_eq!(node.position.distance(layout.center), ring, 1e-9);
        }
        let gate = layout.get("Gate").unwrap();
        let base = layout.get("Base").unwrap();
        assert_approx_eq!(gate.position.x, 500.0 + ring, 1e-9);
        assert_approx_eq!(base.position.x, 500.0 - ring, 1e-9);
    }

    #[test]
    fn fallbacks_are_reproducible_with_a_seed() {
        let catalog = Catalog::new(vec![
            body("Nowhere", BodyKind::Planet, 1.0e6, 1000.0),
            body("Stray", BodyKind::Moon, 1.1e6, 10.0),
        ]);
        let a = layout_seeded(&catalog, VIEW, &NavConfig::default(), 42);
        let b = layout_seeded(&catalog, VIEW, &NavConfig::default(), 42);
        assert_eq!(a, b);

        let planet = a.get("Nowhere").unwrap();
        assert!((planet.position - a.center).abs().max_element() <= 200.0);
        assert!(planet.orbit_radius.is_none());
        let stray = a.get("Stray").unwrap();
        assert_eq!(stray.parent.as_deref(), Some("Nowhere"));
        let dy = stray.position.y - planet.position.y;
        assert!((80.0..=120.0).contains(&dy));
    }

    #[test]
    fn moon_without_planets_uses_default_offset() {
        let catalog = Catalog::new(vec![body("Lonely", BodyKind::Moon, 0.0, 10.0)]);
        let layout = layout_seeded(&catalog, VIEW, &NavConfig::default(), 1);
        assert_eq!(layout.nodes[0].position, DVec2::new(800.0, 550.0));
    }

    #[test]
    fn bodies_sharing_a_name_each_get_a_node() {
        let catalog = Catalog::new(vec![
            body("Navia (Kepler-444b)", BodyKind::Planet, 1.0e6, 12742.0),
            body("Navia (Kepler-444b)", BodyKind::UserObject, 2.0e6, 2.0),
        ]);
        let layout = layout_seeded(&catalog, VIEW, &NavConfig::default(), 5);
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.nodes[0].level, LayoutLevel::Planet);
        assert_eq!(layout.nodes[1].level, LayoutLevel::Other);
    }

    #[test]
    fn empty_catalog_empty_layout() {
        let layout = layout_seeded(&Catalog::default(), VIEW, &NavConfig::default(), 1);
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.center, DVec2::new(500.0, 400.0));
    }
}
