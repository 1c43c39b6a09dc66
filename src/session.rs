//! Everything one map view owns: the merged catalog, the user's imports,
//! the current route, markers and the cached 2D layout.

use crate::catalog::danger_zone::resolve_danger_zones;
use crate::catalog::user_data::{UserDataError, UserDataStore, UserImport};
use crate::catalog::Catalog;
use crate::config::NavConfig;
use crate::gps::ParseError;
use crate::layout::{layout_seeded, Layout2D, Viewport};
use crate::marker::camera::{resolve_jump, JumpRequest, JumpTarget};
use crate::marker::{CoordinateController, MarkerKind, MarkerManager};
use crate::navigation::route::{RouteInputError, RoutePlanner, RouteSummary};

/// Seed for fallback placements in the 2D layout, so redraws are stable.
const LAYOUT_SEED: u64 = 0x5EED;
const SUGGESTION_LIMIT: usize = 10;

pub struct Session {
    config: NavConfig,
    base: Catalog,
    user_data: UserDataStore,
    catalog: Catalog,
    planner: RoutePlanner,
    markers: MarkerManager,
    controller: CoordinateController,
    layout: Option<(Viewport, Layout2D)>,
}

impl Session {
    pub fn new(base: Catalog, user_data: UserDataStore, config: NavConfig) -> Self {
        let mut session = Session {
            markers: MarkerManager::with_limit(config.marker_limit),
            config,
            base,
            user_data,
            catalog: Catalog::default(),
            planner: RoutePlanner::new(),
            controller: CoordinateController::new(),
            layout: None,
        };
        session.rebuild_catalog();
        session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn user_data(&self) -> &UserDataStore {
        &self.user_data
    }

    pub fn markers(&self) -> &MarkerManager {
        &self.markers
    }

    pub fn route(&self) -> Option<&RouteSummary> {
        self.planner.current()
    }

    /// The coordinate controller together with the markers it edits.
    pub fn controls(&mut self) -> (&mut CoordinateController, &mut MarkerManager) {
        (&mut self.controller, &mut self.markers)
    }

    pub fn replace_base(&mut self, base: Catalog) {
        self.base = base;
        self.rebuild_catalog();
    }

    pub fn add_user_csv(&mut self, text: &str, filename: &str) -> Result<UserImport, UserDataError> {
        let import = self.user_data.add_csv(text, filename, &self.base, &mut rand::rng())?;
        self.rebuild_catalog();
        Ok(import)
    }

    pub fn remove_user_file(&mut self, filename: &str) -> usize {
        let removed = self.user_data.remove_file(filename);
        if removed > 0 {
            self.rebuild_catalog();
        }
        removed
    }

    pub fn clear_user_data(&mut self) {
        self.user_data.clear();
        self.rebuild_catalog();
    }

    pub fn suggest(&self, partial: &str) -> Vec<String> {
        self.catalog
            .suggest(partial, SUGGESTION_LIMIT)
            .into_iter()
            .map(|body| body.name.clone())
            .collect()
    }

    /// Plans a route and marks both ends. A failed plan leaves the previous
    /// route and its markers in place.
    pub fn calculate_route(&mut self, start: &str, end: &str) -> Result<&RouteSummary, RouteInputError> {
        let summary = self.planner.calculate(start, end, &self.catalog, &self.config)?;
        self.markers.remove_kind(MarkerKind::Route);
        self.markers
            .add(MarkerKind::Route, summary.start.name.clone(), summary.start.position, false);
        self.markers
            .add(MarkerKind::Route, summary.end.name.clone(), summary.end.position, false);
        Ok(summary)
    }

    pub fn clear_route(&mut self) {
        self.planner.clear();
        self.markers.remove_kind(MarkerKind::Route);
    }

    /// Resolves a jump; typed locations replace the previous jump marker.
    pub fn jump(&mut self, request: JumpRequest<'_>) -> Result<JumpTarget, ParseError> {
        let target = resolve_jump(request, &self.catalog)?;
        if target.place_marker {
            self.markers.remove_kind(MarkerKind::Jump);
            self.markers
                .add(MarkerKind::Jump, target.label.clone(), target.position, false);
        }
        Ok(target)
    }

    /// Cached per viewport; any catalog change recomputes it.
    pub fn layout_2d(&mut self, viewport: Viewport) -> &Layout2D {
        if matches!(&self.layout, Some((cached, _)) if *cached != viewport) {
            self.layout = None;
        }
        let (_, layout) = self.layout.get_or_insert_with(|| {
            log::debug!("recomputing 2D layout for {}x{}", viewport.width, viewport.height);
            (
                viewport,
                layout_seeded(&self.catalog, viewport, &self.config, LAYOUT_SEED),
            )
        });
        layout
    }

    /// Merges base and user bodies. A stored user body whose name the base
    /// already uses is left out so every name maps to one body.
    fn rebuild_catalog(&mut self) {
        let mut bodies = self.base.as_slice().to_vec();
        for body in self.user_data.bodies() {
            if self.base.contains_name(&body.name) {
                log::warn!(
                    "user body {} from {} shadows a catalog body, skipped",
                    body.name,
                    body.source_file.as_deref().unwrap_or("unknown file")
                );
                continue;
            }
            bodies.push(body.clone());
        }
        resolve_danger_zones(&mut bodies, self.config.danger_zone_margin_km);
        self.catalog = Catalog::new(bodies);
        self.layout = None;
        self.clear_route();
        log::info!(
            "catalog rebuilt: {} bodies ({} base)",
            self.catalog.len(),
            self.base.len()
        );
    }
}
