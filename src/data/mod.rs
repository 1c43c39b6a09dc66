use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::CelestialBody;

/// Snapshots ship with the handler, so they are compressed hard.
const CATALOG_COMPRESSION_LEVEL: i32 = 19;

/// Bumped whenever the stored body record changes shape.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// On-disk form of a catalog: the bodies in catalog order behind a
/// format version. The name index is rebuilt on load.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogSnapshot {
    format_version: u32,
    bodies: Vec<CelestialBody>,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
    #[error("snapshot format {found} is not supported (expected {expected}), rebuild it with build_catalog")]
    UnsupportedVersion { found: u32, expected: u32 },
}

pub fn serialize_catalog(catalog: &Catalog) -> Result<Vec<u8>, DataError> {
    let snapshot = CatalogSnapshot {
        format_version: SNAPSHOT_FORMAT_VERSION,
        bodies: catalog.as_slice().to_vec(),
    };
    encode_snapshot(&snapshot)
}

/// Decodes a snapshot written by [`serialize_catalog`]. Snapshots from
/// another format version are refused rather than misread.
pub fn deserialize_catalog(bytes: &[u8]) -> Result<Catalog, DataError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(DataError::Compression)?;
    // the version leads the record, so it is read on its own first
    let found: u32 = bincode::deserialize(&decoded)?;
    if found != SNAPSHOT_FORMAT_VERSION {
        return Err(DataError::UnsupportedVersion {
            found,
            expected: SNAPSHOT_FORMAT_VERSION,
        });
    }
    let snapshot: CatalogSnapshot = bincode::deserialize(&decoded)?;
    let catalog = Catalog::new(snapshot.bodies);
    log::debug!("decoded catalog snapshot v{found} with {} bodies", catalog.len());
    Ok(catalog)
}

fn encode_snapshot(snapshot: &CatalogSnapshot) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(snapshot)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, CATALOG_COMPRESSION_LEVEL).map_err(DataError::Compression)
}

pub fn write_catalog_to_file<P: AsRef<Path>>(catalog: &Catalog, path: P) -> Result<(), DataError> {
    let bytes = serialize_catalog(catalog)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<Catalog, DataError> {
    let bytes = fs::read(path)?;
    deserialize_catalog(&bytes)
}
