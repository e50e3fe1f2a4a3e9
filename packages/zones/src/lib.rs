#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone classification for listing coordinates.
//!
//! A zone is a coarse, non-authoritative grouping label. Two strategies are
//! provided and a caller picks exactly one per aggregation:
//!
//! 1. **City boxes** ([`city_table`]) - first-match lookup against an ordered
//!    table of named bounding boxes, falling back to [`OTHER_ZONE`].
//! 2. **Coordinate buckets** ([`bucket`]) - both components rounded to 2 or 3
//!    decimal places (about 1.1 km or 111 m cells) and joined into a key.
//!
//! Reverse geocoding to a locality name is a network concern and lives in
//! `nearby_geocoder`; it is never used to classify individual listings.

pub mod bucket;
pub mod city_table;

use nearby_listing_models::Coordinate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use bucket::CoordinateBuckets;
pub use city_table::{CityBox, CityTable};

/// Label returned by the city-box strategy when no box matches.
pub const OTHER_ZONE: &str = "Other";

/// Maps a coordinate to a zone label.
pub trait ZoneClassifier {
    /// Returns the zone label for `coordinate`.
    fn classify(&self, coordinate: Coordinate) -> String;
}

/// The zone strategies selectable by name.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ZoneStrategy {
    /// Built-in city bounding-box table.
    #[default]
    #[strum(to_string = "bbox", serialize = "city")]
    #[serde(rename = "bbox")]
    CityBoxes,
    /// Coordinates rounded to 2 decimal places (~1.1 km).
    Bucket2,
    /// Coordinates rounded to 3 decimal places (~111 m).
    Bucket3,
}

impl ZoneStrategy {
    /// Classifies `coordinate` with this strategy.
    ///
    /// [`Self::CityBoxes`] uses [`CityTable::builtin`].
    #[must_use]
    pub fn classify(self, coordinate: Coordinate) -> String {
        match self {
            Self::CityBoxes => CityTable::builtin().classify(coordinate),
            Self::Bucket2 => CoordinateBuckets::new(2).classify(coordinate),
            Self::Bucket3 => CoordinateBuckets::new(3).classify(coordinate),
        }
    }
}

/// Errors from loading a city table.
#[derive(Debug, Error)]
pub enum ZoneTableError {
    /// The TOML document could not be parsed.
    #[error("Failed to parse city table: {0}")]
    Parse(#[from] toml::de::Error),

    /// A city box is malformed.
    #[error("Invalid city box '{name}': {message}")]
    InvalidBox {
        /// City name as written in the table.
        name: String,
        /// What is wrong with it.
        message: String,
    },
}
