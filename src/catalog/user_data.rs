//! Bodies imported by the user from their own CSV files, kept apart from
//! the base catalog and persisted as JSON.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::catalog::csv::{data_lines, escape_field, parse_decimal, split_names, split_record, Header, Row, RowError};
use crate::gps::token::{GpsColor, GpsToken};
use crate::{BodyKind, CelestialBody, Rgb};

/// Diameter given to imported bodies without one, metres.
pub const DEFAULT_DIAMETER_M: f64 = 2000.0;
pub const DEFAULT_TYPE_LABEL: &str = "User object";
pub const DEFAULT_DESCRIPTION: &str = "Object added by user";

/// High-contrast colours handed out to imported bodies without one.
pub const USER_PALETTE: [Rgb; 8] = [
    Rgb(0xFF4444),
    Rgb(0x4444FF),
    Rgb(0x44FF44),
    Rgb(0xFFFF44),
    Rgb(0xFF44FF),
    Rgb(0x44FFFF),
    Rgb(0xFF8844),
    Rgb(0x8844FF),
];

pub const EXPORT_COLUMNS: [&str; 14] = [
    "name",
    "type",
    "x",
    "y",
    "z",
    "diameter",
    "color",
    "objectType",
    "description",
    "resources",
    "poeticDescription",
    "gravityRange",
    "containedObjects",
    "seGPS",
];

#[derive(Debug, Error)]
pub enum UserDataError {
    #[error("file needs a header and at least one data row")]
    TooShort,
    #[error("file must have columns name + (x, y, z) or name + seGPS")]
    MissingColumns,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default)]
pub struct UserImport {
    pub added: usize,
    pub errors: Vec<RowError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub name: String,
    pub count: usize,
}

/// User bodies in import order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserDataStore {
    bodies: Vec<CelestialBody>,
}

impl UserDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Imports a user CSV, tagging every accepted row with `filename`.
    /// Rows named like a body in `base` or already in the store are
    /// rejected. Colourless rows draw a palette colour from `rng`.
    pub fn add_csv<R: Rng + ?Sized>(
        &mut self,
        text: &str,
        filename: &str,
        base: &Catalog,
        rng: &mut R,
    ) -> Result<UserImport, UserDataError> {
        let (bodies, errors) = {
            let stored: HashSet<&str> = self.bodies.iter().map(|body| body.name.as_str()).collect();
            parse_user_csv(text, |name| base.contains_name(name) || stored.contains(name), rng)?
        };
        let added = bodies.len();
        self.bodies.extend(bodies.into_iter().map(|mut body| {
            body.source_file = Some(filename.to_string());
            body
        }));
        log::info!("imported {added} user bodies from {filename} ({} rejected)", errors.len());
        Ok(UserImport { added, errors })
    }

    pub fn remove_file(&mut self, filename: &str) -> usize {
        let before = self.bodies.len();
        self.bodies
            .retain(|body| body.source_file.as_deref() != Some(filename));
        before - self.bodies.len()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Source files in first-import order, with their body counts.
    pub fn source_files(&self) -> Vec<SourceFile> {
        let mut files: Vec<SourceFile> = Vec::new();
        for body in &self.bodies {
            let name = body.source_file.as_deref().unwrap_or_default();
            match files.iter_mut().find(|file| file.name == name) {
                Some(file) => file.count += 1,
                None => files.push(SourceFile {
                    name: name.to_string(),
                    count: 1,
                }),
            }
        }
        files
    }

    /// Renders the store as a CSV the importer reads back. `None` when
    /// there is nothing to export.
    pub fn export_csv(&self) -> Option<String> {
        if self.bodies.is_empty() {
            return None;
        }
        let mut lines = vec![EXPORT_COLUMNS.join(";")];
        for body in &self.bodies {
            let gps = GpsToken::new(body.name.clone(), body.position).with_color(GpsColor::Rgb(body.color.0));
            let values = [
                body.name.clone(),
                body.type_label.clone(),
                body.position.x.to_string(),
                body.position.y.to_string(),
                body.position.z.to_string(),
                (body.diameter_km * 1000.0).to_string(),
                body.color.to_hex_string(),
                body.kind.as_str().to_string(),
                body.description.clone(),
                body.resources.clone(),
                body.poetic_description.clone(),
                body.gravity_range_km.map(|g| g.to_string()).unwrap_or_default(),
                body.contained_objects.join(", "),
                gps.to_string(),
            ];
            let escaped: Vec<String> = values.iter().map(|value| escape_field(value)).collect();
            lines.push(escaped.join(";"));
        }
        Some(lines.join("\n"))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), UserDataError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Loads a saved store; a missing file is an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, UserDataError> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Parses a user CSV without touching any store. A row whose name
/// `is_taken` reports, or that repeats an earlier row, becomes a
/// [`RowError`] on the `name` column.
pub fn parse_user_csv<R: Rng + ?Sized>(
    text: &str,
    is_taken: impl Fn(&str) -> bool,
    rng: &mut R,
) -> Result<(Vec<CelestialBody>, Vec<RowError>), UserDataError> {
    let text = text.trim_start_matches('\u{feff}').trim();
    let mut lines = text.lines();
    let header_line = lines.next().ok_or(UserDataError::TooShort)?;
    if lines.next().is_none() {
        return Err(UserDataError::TooShort);
    }
    let header = Header::parse(header_line.trim_end_matches('\r'));
    let has_xyz = ["x", "y", "z"].iter().all(|c| header.has(c));
    if !header.has("name") || !(has_xyz || header.has("seGPS")) {
        return Err(UserDataError::MissingColumns);
    }

    let mut bodies = Vec::new();
    let mut errors = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (line_no, line) in data_lines(text) {
        let fields = split_record(line);
        let row = header.row(&fields);
        let name = row.get("name");
        if name.is_empty() {
            continue;
        }
        if is_taken(name) || seen.contains(name) {
            errors.push(RowError {
                line: line_no,
                column: "name".into(),
                message: format!("duplicate name `{name}`"),
            });
            continue;
        }
        match user_body_from_row(&row, line_no, rng) {
            Ok(body) => {
                seen.insert(body.name.clone());
                bodies.push(body);
            }
            Err(err) => errors.push(err),
        }
    }
    Ok((bodies, errors))
}

fn column_number(row: &Row<'_>, column: &str, line: usize) -> Result<f64, RowError> {
    parse_decimal(row.get(column)).ok_or_else(|| RowError {
        line,
        column: column.to_string(),
        message: format!("expected a number, found `{}`", row.get(column)),
    })
}

/// An empty cell is `None`; anything else must be a number.
fn optional_number(row: &Row<'_>, column: &str, line: usize) -> Result<Option<f64>, RowError> {
    match row.non_empty(column) {
        Some(_) => column_number(row, column, line).map(Some),
        None => Ok(None),
    }
}

fn user_body_from_row<R: Rng + ?Sized>(row: &Row<'_>, line: usize, rng: &mut R) -> Result<CelestialBody, RowError> {
    let gps = row
        .non_empty("seGPS")
        .and_then(|raw| match GpsToken::parse_strict(raw) {
            Ok(token) => Some(token),
            Err(err) => {
                log::warn!("line {line}: seGPS for {} rejected ({err}), using x/y/z", row.get("name"));
                None
            }
        });

    let position = match &gps {
        Some(token) => token.position,
        None => DVec3::new(
            column_number(row, "x", line)?,
            column_number(row, "y", line)?,
            column_number(row, "z", line)?,
        ),
    };
    let diameter_m = match gps.as_ref().and_then(|token| token.size_m) {
        Some(size) => Some(size),
        None => match optional_number(row, "diameter", line)? {
            Some(d) if d < 0.0 => {
                return Err(RowError {
                    line,
                    column: "diameter".into(),
                    message: format!("diameter must not be negative, found `{}`", row.get("diameter")),
                })
            }
            other => other,
        },
    };
    // zero reads as unset
    let diameter_m = diameter_m.filter(|d| *d > 0.0).unwrap_or(DEFAULT_DIAMETER_M);
    let color = gps
        .as_ref()
        .and_then(|token| token.color)
        .map(|c| Rgb(c.rgb()))
        .or_else(|| Rgb::parse_hex(row.get("color")))
        .unwrap_or_else(|| USER_PALETTE[rng.random_range(0..USER_PALETTE.len())]);

    let kind = match row.non_empty("objectType") {
        Some(object_type) => BodyKind::from_object_type(object_type),
        None => BodyKind::UserObject,
    };
    let mut body = CelestialBody::new(row.get("name"), kind, position, diameter_m / 1000.0);
    body.type_label = row.non_empty("type").unwrap_or(DEFAULT_TYPE_LABEL).to_string();
    body.description = row
        .non_empty("description")
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    body.color = color;
    body.gravity_range_km = optional_number(row, "gravityRange", line)?;
    body.contained_objects = split_names(row.get("containedObjects"));
    body.resources = row.get("resources").to_string();
    body.poetic_description = row.get("poeticDescription").to_string();
    body.is_user_supplied = true;
    Ok(body)
}
