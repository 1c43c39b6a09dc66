//! Base catalog loading.
//!
//! A load runs `Fetching -> Loaded`, or on failure `Fetching ->
//! RetryingPlain -> Loaded | Failed`. A failed load yields an empty catalog
//! so the map still opens.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::csv::{parse_catalog_csv, CsvError, RowError};
use crate::catalog::danger_zone::resolve_danger_zones;
use crate::catalog::Catalog;

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("invalid catalog: {0}")]
    Csv(#[from] CsvError),
}

/// How a fetcher should treat intermediate caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
    /// Bypass every cache (cache-busting query, no-cache headers).
    NoCache,
    /// Plain request, used for the retry.
    Plain,
}

pub trait CatalogFetcher {
    /// Human-readable origin for log lines.
    fn describe(&self) -> String;

    fn fetch(&self, mode: FetchMode) -> Result<String, CatalogLoadError>;
}

/// Reads the catalog from a local file. Both modes read the same file.
#[derive(Clone, Debug)]
pub struct FileFetcher {
    pub path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileFetcher { path: path.into() }
    }
}

impl CatalogFetcher for FileFetcher {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self, _mode: FetchMode) -> Result<String, CatalogLoadError> {
        Ok(fs::read_to_string(&self.path)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Fetching,
    RetryingPlain,
    Loaded,
    Failed,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub state: LoadState,
    pub catalog: Catalog,
    pub row_errors: Vec<RowError>,
    /// One entry per failed attempt, in order.
    pub fetch_errors: Vec<CatalogLoadError>,
}

/// Parses catalog text and auto-sizes sentinel danger zones.
pub fn catalog_from_csv(
    text: &str,
    danger_zone_margin_km: f64,
) -> Result<(Catalog, Vec<RowError>), CsvError> {
    let mut parse = parse_catalog_csv(text)?;
    resolve_danger_zones(&mut parse.bodies, danger_zone_margin_km);
    Ok((Catalog::new(parse.bodies), parse.errors))
}

pub struct CatalogLoader<F> {
    fetcher: F,
    danger_zone_margin_km: f64,
    state: LoadState,
    catalog: Catalog,
    row_errors: Vec<RowError>,
    fetch_errors: Vec<CatalogLoadError>,
}

impl<F: CatalogFetcher> CatalogLoader<F> {
    pub fn new(fetcher: F, danger_zone_margin_km: f64) -> Self {
        CatalogLoader {
            fetcher,
            danger_zone_margin_km,
            state: LoadState::Fetching,
            catalog: Catalog::default(),
            row_errors: Vec::new(),
            fetch_errors: Vec::new(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Performs one attempt and moves to the next state.
    pub fn step(&mut self) -> LoadState {
        let mode = match self.state {
            LoadState::Fetching => FetchMode::NoCache,
            LoadState::RetryingPlain => FetchMode::Plain,
            terminal => return terminal,
        };

        let attempt = self.fetcher.fetch(mode).and_then(|text| {
            catalog_from_csv(&text, self.danger_zone_margin_km).map_err(CatalogLoadError::from)
        });

        self.state = match (attempt, self.state) {
            (Ok((catalog, row_errors)), _) => {
                log::info!(
                    "loaded {} bodies from {} ({} rows rejected)",
                    catalog.len(),
                    self.fetcher.describe(),
                    row_errors.len()
                );
                for err in &row_errors {
                    log::warn!("catalog row rejected: {err}");
                }
                self.catalog = catalog;
                self.row_errors = row_errors;
                LoadState::Loaded
            }
            (Err(err), LoadState::Fetching) => {
                log::warn!(
                    "catalog fetch from {} failed, retrying without cache directives: {err}",
                    self.fetcher.describe()
                );
                self.fetch_errors.push(err);
                LoadState::RetryingPlain
            }
            (Err(err), _) => {
                log::error!(
                    "catalog retry from {} failed, continuing with an empty catalog: {err}",
                    self.fetcher.describe()
                );
                self.fetch_errors.push(err);
                LoadState::Failed
            }
        };
        self.state
    }

    pub fn run(mut self) -> LoadOutcome {
        while !self.state.is_terminal() {
            self.step();
        }
        LoadOutcome {
            state: self.state,
            catalog: self.catalog,
            row_errors: self.row_errors,
            fetch_errors: self.fetch_errors,
        }
    }
}

/// Loads a catalog, retrying once; never fails.
pub fn load_catalog<F: CatalogFetcher>(fetcher: F, danger_zone_margin_km: f64) -> LoadOutcome {
    CatalogLoader::new(fetcher, danger_zone_margin_km).run()
}
