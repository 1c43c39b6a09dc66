pub mod csv;
pub mod danger_zone;
pub mod loader;
#[cfg(feature = "remote")]
pub mod remote;
pub mod user_data;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::CelestialBody;

/// The set of bodies loaded for a session, in load order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    bodies: Vec<CelestialBody>,
    #[serde(skip)]
    name_index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(bodies: Vec<CelestialBody>) -> Self {
        let mut catalog = Catalog {
            bodies,
            name_index: HashMap::new(),
        };
        catalog.rebuild_indices();
        catalog
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn as_slice(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn into_bodies(self) -> Vec<CelestialBody> {
        self.bodies
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CelestialBody> {
        self.bodies.iter()
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&CelestialBody> {
        self.index_of_name(name)
            .and_then(|idx| self.bodies.get(idx))
            .filter(|body| body.name == name)
    }

    /// First body (in catalog order) whose name contains `fragment`,
    /// ignoring case.
    pub fn find_by_fragment(&self, fragment: &str) -> Option<&CelestialBody> {
        let needle = fragment.to_lowercase();
        self.bodies
            .iter()
            .find(|body| body.name.to_lowercase().contains(&needle))
    }

    /// Up to `limit` name suggestions for a partially typed location.
    /// Inputs shorter than two characters or starting with `gps:` get none.
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<&CelestialBody> {
        let needle = partial.trim().to_lowercase();
        if needle.chars().count() < 2 || needle.starts_with("gps:") {
            return Vec::new();
        }
        self.bodies
            .iter()
            .filter(|body| body.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    /// Keeps the first occurrence of each name.
    pub fn rebuild_indices(&mut self) {
        self.name_index.clear();
        for (idx, body) in self.bodies.iter().enumerate() {
            self.name_index.entry(body.name.clone()).or_insert(idx);
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CelestialBody;
    type IntoIter = std::slice::Iter<'a, CelestialBody>;

    fn into_iter(self) -> Self::IntoIter {
        self.bodies.iter()
    }
}
