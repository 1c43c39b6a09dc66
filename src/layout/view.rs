//! Pan/zoom transform over a [`Layout2D`], plus hit-testing and the
//! outlines drawn for danger zones.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::layout::engine::{Layout2D, Layout2DNode};
use crate::{BodyKind, CelestialBody};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;
/// Extra pick tolerance around a node, in screen pixels.
const PICK_SLOP: f64 = 5.0;
/// Planets and moons closer than this (metres, 3D) fall inside a zone.
pub const ZONE_PROXIMITY_M: f64 = 200_000.0;
const ZONE_PADDING: f64 = 20.0;
/// Gap between the zone bounds and the drawn outline.
const ZONE_OUTLINE_GAP: f64 = 30.0;
const ZONE_LABEL_DROP: f64 = 50.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct View2d {
    pub scale: f64,
    pub offset: DVec2,
}

impl Default for View2d {
    fn default() -> Self {
        View2d {
            scale: 1.0,
            offset: DVec2::ZERO,
        }
    }
}

impl View2d {
    pub fn to_screen(&self, point: DVec2) -> DVec2 {
        (point + self.offset) * self.scale
    }

    pub fn to_layout(&self, screen: DVec2) -> DVec2 {
        screen / self.scale - self.offset
    }

    /// Drags the map by a screen-space delta.
    pub fn pan(&mut self, screen_delta: DVec2) {
        self.offset += screen_delta / self.scale;
    }

    /// One wheel notch: positive `wheel_delta` zooms out. The layout point
    /// under `cursor` stays put.
    ///
    /// Returns false when the scale is already at its limit.
    pub fn zoom_at(&mut self, cursor: DVec2, wheel_delta: f64) -> bool {
        let factor = if wheel_delta > 0.0 { 0.9 } else { 1.1 };
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if scale == self.scale {
            return false;
        }
        let anchor = self.to_layout(cursor);
        self.scale = scale;
        self.offset = cursor / scale - anchor;
        true
    }

    /// First node (in layout order) under the cursor. Danger zones have no
    /// disc of their own and are never picked.
    pub fn pick<'a>(&self, layout: &'a Layout2D, cursor: DVec2) -> Option<&'a Layout2DNode> {
        layout
            .nodes
            .iter()
            .filter(|node| node.kind != BodyKind::DangerZone)
            .find(|node| {
                let reach = node.display_radius * self.scale + PICK_SLOP;
                self.to_screen(node.position).distance(cursor) <= reach
            })
    }

    /// Screen-space circle outlining a zone.
    pub fn zone_outline(&self, bounds: &ZoneBounds) -> (DVec2, f64) {
        let center = self.to_screen(bounds.center);
        (center, (bounds.radius + ZONE_OUTLINE_GAP) * self.scale)
    }

    /// Where the zone's name is drawn, centred on this point.
    pub fn zone_label_anchor(&self, bounds: &ZoneBounds) -> DVec2 {
        let (center, radius) = self.zone_outline(bounds);
        DVec2::new(center.x, center.y + radius + ZONE_LABEL_DROP * self.scale)
    }

    pub fn label_font_size(&self) -> f64 {
        (12.0 * self.scale).clamp(8.0, 16.0)
    }

    /// Hit test against the approximate text box of each zone label.
    pub fn pick_zone_label<'a>(
        &self,
        catalog: &'a Catalog,
        layout: &Layout2D,
        cursor: DVec2,
    ) -> Option<&'a CelestialBody> {
        let font = self.label_font_size();
        catalog
            .iter()
            .filter(|body| body.kind == BodyKind::DangerZone)
            .find(|zone| {
                let Some(bounds) = zone_bounds(zone, catalog, layout) else {
                    return false;
                };
                let anchor = self.zone_label_anchor(&bounds);
                let half_width = zone.name.chars().count() as f64 * font * 0.6 / 2.0;
                let half_height = font * 1.2 / 2.0;
                (cursor.x - anchor.x).abs() <= half_width && (cursor.y - anchor.y).abs() <= half_height
            })
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ZoneBounds {
    pub center: DVec2,
    pub radius: f64,
}

/// Layout nodes a danger zone is drawn around: the planets and moons near
/// it in space, or failing that the nearest planet and its moons.
pub fn zone_members<'a>(zone: &CelestialBody, catalog: &Catalog, layout: &'a Layout2D) -> Vec<&'a Layout2DNode> {
    let near: Vec<&Layout2DNode> = layout
        .nodes
        .iter()
        .filter(|node| matches!(node.kind, BodyKind::Planet | BodyKind::Moon))
        .filter(|node| {
            catalog
                .get(&node.name)
                .is_some_and(|body| body.distance(zone) < ZONE_PROXIMITY_M)
        })
        .collect();
    if !near.is_empty() {
        return near;
    }

    let nearest = layout
        .nodes
        .iter()
        .filter(|node| node.kind == BodyKind::Planet)
        .filter_map(|node| catalog.get(&node.name).map(|body| (node, body.distance(zone))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(node, _)| node);
    let Some(planet) = nearest else {
        return Vec::new();
    };

    let mut members = vec![planet];
    members.extend(
        layout
            .nodes
            .iter()
            .filter(|node| node.kind == BodyKind::Moon && node.parent.as_deref() == Some(planet.name.as_str())),
    );
    members
}

/// Bounding circle of the zone's members in layout space, or `None` when
/// the zone has nothing to surround.
pub fn zone_bounds(zone: &CelestialBody, catalog: &Catalog, layout: &Layout2D) -> Option<ZoneBounds> {
    let members = zone_members(zone, catalog, layout);
    if members.is_empty() {
        return None;
    }
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for node in members {
        let r = DVec2::splat(node.display_radius);
        min = min.min(node.position - r);
        max = max.max(node.position + r);
    }
    let half = (max - min) / 2.0;
    Some(ZoneBounds {
        center: (min + max) / 2.0,
        radius: half.max_element() + ZONE_PADDING,
    })
}
