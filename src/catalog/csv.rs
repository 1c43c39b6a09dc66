//! Semicolon-delimited catalog files.
//!
//! Records are one per line. A `"` toggles quoting anywhere in a field and
//! `""` is a literal quote, so descriptions may contain `;` and `"`.

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use thiserror::Error;

use crate::{BodyKind, CelestialBody, Rgb};

pub const CATALOG_COLUMNS: [&str; 13] = [
    "name",
    "type",
    "objectType",
    "x",
    "y",
    "z",
    "diameter",
    "color",
    "gravityRange",
    "containedObjects",
    "description",
    "resources",
    "poeticDescription",
];

#[derive(Debug, Error, PartialEq)]
pub enum CsvError {
    #[error("catalog file is empty")]
    Empty,
    #[error("header is missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// A rejected data row. `line` is 1-based and counts the header.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("line {line}, column `{column}`: {message}")]
pub struct RowError {
    pub line: usize,
    pub column: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogParse {
    pub bodies: Vec<CelestialBody>,
    pub errors: Vec<RowError>,
}

/// Splits one record into raw (untrimmed) fields.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut buffer = String::new();
    let mut in_quote = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if chars.peek() == Some(&'"') => {
                buffer.push('"');
                chars.next();
            }
            '"' => in_quote = !in_quote,
            ';' if !in_quote => fields.push(std::mem::take(&mut buffer)),
            _ => buffer.push(ch),
        }
    }
    fields.push(buffer);
    fields
}

/// Quotes a field for output when it contains `;` or `"`.
pub fn escape_field(value: &str) -> String {
    if value.contains(';') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Parses a number written with either `.` or `,` as decimal separator.
/// Only finite values are accepted.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let normalised = value.trim().replacen(',', ".", 1);
    normalised
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// A header row mapped to column positions; data rows become
/// column-name lookups.
#[derive(Clone, Debug)]
pub struct Header {
    columns: HashMap<String, usize>,
}

impl Header {
    pub fn parse(line: &str) -> Self {
        let columns = split_record(line)
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();
        Header { columns }
    }

    pub fn has(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn row<'a>(&'a self, fields: &'a [String]) -> Row<'a> {
        Row {
            header: self,
            fields,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    header: &'a Header,
    fields: &'a [String],
}

impl<'a> Row<'a> {
    /// Trimmed field value; missing columns read as empty.
    pub fn get(&self, column: &str) -> &'a str {
        self.header
            .columns
            .get(column)
            .and_then(|&idx| self.fields.get(idx))
            .map(|value| value.trim())
            .unwrap_or("")
    }

    pub fn non_empty(&self, column: &str) -> Option<&'a str> {
        Some(self.get(column)).filter(|value| !value.is_empty())
    }
}

/// Iterates over `(line_number, line)` for non-blank data lines.
pub(crate) fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

pub(crate) fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a base catalog file. Rows without a name are skipped; rows with
/// bad numbers or duplicate names are collected as [`RowError`]s.
pub fn parse_catalog_csv(text: &str) -> Result<CatalogParse, CsvError> {
    let text = text.trim_start_matches('\u{feff}');
    let header_line = text
        .lines()
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or(CsvError::Empty)?;
    let header = Header::parse(header_line.trim_end_matches('\r'));
    for required in ["name", "x", "y", "z"] {
        if !header.has(required) {
            return Err(CsvError::MissingColumn(required));
        }
    }

    let mut parse = CatalogParse::default();
    let mut seen = HashSet::new();
    for (line_no, line) in data_lines(text) {
        let fields = split_record(line);
        let row = header.row(&fields);
        if row.get("name").is_empty() {
            continue;
        }
        match body_from_row(&row, line_no) {
            Ok(body) => {
                if seen.insert(body.name.clone()) {
                    parse.bodies.push(body);
                } else {
                    parse.errors.push(RowError {
                        line: line_no,
                        column: "name".into(),
                        message: format!("duplicate name `{}`", body.name),
                    });
                }
            }
            Err(err) => parse.errors.push(err),
        }
    }

    log::debug!(
        "parsed catalog: {} bodies, {} rejected rows",
        parse.bodies.len(),
        parse.errors.len()
    );
    Ok(parse)
}

fn required_number(row: &Row<'_>, column: &str, line: usize) -> Result<f64, RowError> {
    parse_decimal(row.get(column)).ok_or_else(|| RowError {
        line,
        column: column.to_string(),
        message: format!("expected a number, found `{}`", row.get(column)),
    })
}

fn body_from_row(row: &Row<'_>, line: usize) -> Result<CelestialBody, RowError> {
    let position = DVec3::new(
        required_number(row, "x", line)?,
        required_number(row, "y", line)?,
        required_number(row, "z", line)?,
    );
    let diameter_km = match row.non_empty("diameter") {
        None => 0.0,
        Some(_) => required_number(row, "diameter", line)?,
    };
    if diameter_km < 0.0 {
        return Err(RowError {
            line,
            column: "diameter".into(),
            message: format!("diameter must not be negative, found {diameter_km}"),
        });
    }
    let gravity_range_km = match row.non_empty("gravityRange") {
        None => None,
        Some(_) => Some(required_number(row, "gravityRange", line)?),
    };

    let mut body = CelestialBody::new(
        row.get("name"),
        BodyKind::from_object_type(row.get("objectType")),
        position,
        diameter_km,
    );
    body.type_label = row.get("type").to_string();
    body.color = Rgb::parse_or_white(row.get("color"));
    body.gravity_range_km = gravity_range_km;
    body.contained_objects = split_names(row.get("containedObjects"));
    body.description = row.get("description").to_string();
    body.resources = row.get("resources").to_string();
    body.poetic_description = row.get("poeticDescription").to_string();
    Ok(body)
}
