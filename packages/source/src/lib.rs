#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads listings from delimited text.
//!
//! Headers are normalized (trimmed, lowercased, BOM stripped) and matched
//! against known aliases in English and Spanish (see [`columns::Field`]).
//! A source without latitude or longitude columns is rejected outright;
//! every other problem is local to a cell and just leaves that field empty.

pub mod columns;
pub mod parsing;

use std::io::Read;
use std::path::{Path, PathBuf};

use nearby_listing_models::{Coordinate, Listing};

use crate::columns::{ColumnMap, normalize_header};
use crate::parsing::{parse_amount, parse_count, parse_degrees, parse_text};

/// Errors that can occur while loading a listing source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The delimited text is malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent.
    #[error("Missing required column '{column}' (accepted headers: {accepted}; found: {found})")]
    MissingColumn {
        /// Canonical name of the missing column.
        column: &'static str,
        /// Header names that would have satisfied it.
        accepted: String,
        /// Normalized headers present in the source.
        found: String,
    },
}

/// How to read a listing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Loads listings from a file.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened, is not valid
/// delimited text, or lacks a coordinate column.
pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Vec<Listing>, SourceError> {
    let file = std::fs::File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loading listings from {}", path.display());
    load_reader(file, options)
}

/// Loads listings from any reader.
///
/// # Errors
///
/// Returns [`SourceError`] if the input is not valid delimited text or lacks
/// a coordinate column.
pub fn load_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Vec<Listing>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut listings = Vec::new();
    let mut missing_coordinates = 0_usize;
    let mut malformed = 0_usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                malformed += 1;
                log::warn!(
                    "Skipping malformed row at line {}: {e}",
                    e.position().map_or(0, csv::Position::line)
                );
                continue;
            }
        };
        let listing = parse_row(&record, &columns);
        if listing.coordinate.is_none() {
            missing_coordinates += 1;
            log::debug!(
                "Row {} has no usable coordinate",
                record.position().map_or(0, csv::Position::line)
            );
        }
        listings.push(listing);
    }

    log::info!(
        "Loaded {} listings ({} without coordinates, {} malformed rows skipped)",
        listings.len(),
        missing_coordinates,
        malformed
    );

    Ok(listings)
}

fn parse_row(record: &csv::StringRecord, columns: &ColumnMap) -> Listing {
    let cell = |index: Option<usize>| index.and_then(|i| record.get(i));

    let latitude = cell(Some(columns.latitude)).and_then(parse_degrees);
    let longitude = cell(Some(columns.longitude)).and_then(parse_degrees);
    let coordinate = latitude
        .zip(longitude)
        .map(|(lat, lon)| Coordinate::new(lat, lon));

    let attributes = columns
        .attributes
        .iter()
        .filter_map(|(i, name)| {
            let value = record.get(*i)?.trim();
            (!value.is_empty()).then(|| (name.clone(), value.to_string()))
        })
        .collect();

    Listing {
        client_name: cell(columns.client_name).and_then(parse_text),
        price: cell(columns.price).and_then(parse_amount),
        area_m2: cell(columns.area).and_then(parse_amount),
        bedrooms: cell(columns.bedrooms).and_then(parse_count),
        bathrooms: cell(columns.bathrooms).and_then(parse_count),
        coordinate,
        attributes,
    }
}
