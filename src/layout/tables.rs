//! Hand-tuned placement data for the bodies of the home system. Bodies not
//! listed here fall back to heuristics in the layout engine.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanetType {
    Terrestrial,
    GasGiant,
    IceGiant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetOrbit {
    /// Orbit radius in orbit units; multiplied by the orbit scale.
    pub orbit_distance: f64,
    pub planet_type: PlanetType,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoonOrbit {
    pub parent: &'static str,
    /// Distance from the parent in pixels before the moon scale.
    pub moon_distance: f64,
}

pub const PLANET_ORBITS: &[(&str, PlanetOrbit)] = &[
    (
        "Navia (Kepler-444b)",
        PlanetOrbit { orbit_distance: 0.4, planet_type: PlanetType::Terrestrial },
    ),
    (
        "Ravok (Kepler-444c)",
        PlanetOrbit { orbit_distance: 0.8, planet_type: PlanetType::Terrestrial },
    ),
    (
        "Triton (Kepler-444d)",
        PlanetOrbit { orbit_distance: 1.5, planet_type: PlanetType::IceGiant },
    ),
    (
        "Pertam (Kepler-444e)",
        PlanetOrbit { orbit_distance: 2.2, planet_type: PlanetType::Terrestrial },
    ),
    (
        "Vorath (Kepler-444f)",
        PlanetOrbit { orbit_distance: 3.5, planet_type: PlanetType::GasGiant },
    ),
];

pub const MOON_ORBITS: &[(&str, MoonOrbit)] = &[
    (
        "Elyra (Kepler-444b-1)",
        MoonOrbit { parent: "Navia (Kepler-444b)", moon_distance: 60.0 },
    ),
    (
        "Europa (Kepler-444c-1)",
        MoonOrbit { parent: "Ravok (Kepler-444c)", moon_distance: 45.0 },
    ),
    (
        "Torvion (Kepler-444e-1)",
        MoonOrbit { parent: "Pertam (Kepler-444e)", moon_distance: 35.0 },
    ),
    (
        "Phrygia (Kepler-444e-2)",
        MoonOrbit { parent: "Pertam (Kepler-444e)", moon_distance: 50.0 },
    ),
    (
        "Titan (Kepler-444f-1)",
        MoonOrbit { parent: "Vorath (Kepler-444f)", moon_distance: 80.0 },
    ),
];

pub fn planet_orbit(name: &str) -> Option<PlanetOrbit> {
    PLANET_ORBITS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, orbit)| *orbit)
}

pub fn moon_orbit(name: &str) -> Option<MoonOrbit> {
    MOON_ORBITS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, orbit)| *orbit)
}
