use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

pub type MarkerId = u64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Jump,
    Route,
    Controller,
    Custom,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub label: String,
    pub position: DVec3,
    /// Persistent markers survive bulk clears and the marker limit.
    pub persistent: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarkerStats {
    pub total: usize,
    pub persistent: usize,
    pub by_kind: BTreeMap<MarkerKind, usize>,
}

/// All markers placed on the map. Ids increase monotonically, so they
/// double as creation order.
#[derive(Clone, Debug)]
pub struct MarkerManager {
    markers: Vec<Marker>,
    next_id: MarkerId,
    limit: usize,
}

impl Default for MarkerManager {
    fn default() -> Self {
        Self::with_limit(10)
    }
}

impl MarkerManager {
    pub fn with_limit(limit: usize) -> Self {
        MarkerManager {
            markers: Vec::new(),
            next_id: 0,
            limit,
        }
    }

    pub fn add(
        &mut self,
        kind: MarkerKind,
        label: impl Into<String>,
        position: DVec3,
        persistent: bool,
    ) -> MarkerId {
        self.next_id += 1;
        let marker = Marker {
            id: self.next_id,
            kind,
            label: label.into(),
            position,
            persistent,
        };
        log::debug!("marker {} added: {} ({:?})", marker.id, marker.label, kind);
        self.markers.push(marker);
        self.enforce_limit();
        self.next_id
    }

    pub fn remove(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        before != self.markers.len()
    }

    /// Removes non-persistent markers of one kind.
    pub fn remove_kind(&mut self, kind: MarkerKind) -> usize {
        self.remove_where(|m| m.kind == kind && !m.persistent)
    }

    pub fn clear_non_persistent(&mut self) -> usize {
        self.remove_where(|m| !m.persistent)
    }

    pub fn clear_all(&mut self) {
        self.markers.clear();
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id == id)
    }

    pub fn by_kind(&self, kind: MarkerKind) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.kind == kind)
    }

    pub fn all(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn stats(&self) -> MarkerStats {
        let mut stats = MarkerStats {
            total: self.markers.len(),
            ..MarkerStats::default()
        };
        for marker in &self.markers {
            *stats.by_kind.entry(marker.kind).or_insert(0) += 1;
            if marker.persistent {
                stats.persistent += 1;
            }
        }
        stats
    }

    fn remove_where(&mut self, pred: impl Fn(&Marker) -> bool) -> usize {
        let before = self.markers.len();
        self.markers.retain(|m| !pred(m));
        before - self.markers.len()
    }

    /// Drops the oldest non-persistent markers beyond the limit.
    fn enforce_limit(&mut self) {
        let transient = self.markers.iter().filter(|m| !m.persistent).count();
        let mut excess = transient.saturating_sub(self.limit);
        if excess == 0 {
            return;
        }
        // markers are kept in creation order
        self.markers.retain(|m| {
            if excess > 0 && !m.persistent {
                excess -= 1;
                log::debug!("marker {} evicted by limit", m.id);
                false
            } else {
                true
            }
        });
    }
}
