use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::Serialize;
use starmap_navigator::catalog::loader::{load_catalog, CatalogFetcher, FileFetcher, LoadOutcome, LoadState};
use starmap_navigator::catalog::remote::HttpFetcher;
use starmap_navigator::data::write_catalog_to_file;
use starmap_navigator::NavConfig;

#[derive(Debug, Serialize)]
struct CatalogMetadata {
    source: String,
    bodies: usize,
    by_kind: BTreeMap<String, usize>,
    rejected_rows: usize,
    generated_at_epoch: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(source) = args.next() else {
        bail!("usage: build_catalog <catalog.csv | url> [output dir]");
    };
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let config = NavConfig::from_env().context("failed to read STARMAP_CONFIG")?;

    info!("Building catalog snapshot from {source}");
    let outcome = if source.starts_with("http://") || source.starts_with("https://") {
        let fetcher = HttpFetcher::new(source.as_str()).context("failed to set up HTTP client")?;
        load(fetcher, &config)
    } else {
        load(FileFetcher::new(&source), &config)
    };

    if outcome.state == LoadState::Failed {
        for err in &outcome.fetch_errors {
            warn!("fetch attempt failed: {err}");
        }
        bail!("could not load catalog from {source}");
    }
    for err in &outcome.row_errors {
        warn!("rejected row: {err}");
    }

    let catalog = outcome.catalog;
    fs::create_dir_all(&output_dir).context("failed to create catalog output directory")?;
    let snapshot_path = output_dir.join("catalog.bin");
    write_catalog_to_file(&catalog, &snapshot_path)
        .with_context(|| format!("failed to write snapshot to {}", snapshot_path.display()))?;

    let mut by_kind = BTreeMap::new();
    for body in &catalog {
        *by_kind.entry(body.kind.to_string()).or_insert(0) += 1;
    }
    let metadata = CatalogMetadata {
        source,
        bodies: catalog.len(),
        by_kind,
        rejected_rows: outcome.row_errors.len(),
        generated_at_epoch: current_epoch_seconds(),
    };

    let metadata_path = output_dir.join("catalog.meta.json");
    let metadata_json = serde_json::to_vec_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("failed to write metadata to {}", metadata_path.display()))?;

    info!(
        "Wrote catalog snapshot to {} ({} bodies, {} rows rejected)",
        snapshot_path.display(),
        metadata.bodies,
        metadata.rejected_rows
    );

    Ok(())
}

fn load<F: CatalogFetcher>(fetcher: F, config: &NavConfig) -> LoadOutcome {
    load_catalog(fetcher, config.danger_zone_margin_km)
}

fn current_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
