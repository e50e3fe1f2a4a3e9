#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing, coordinate and query types for the nearby listings engine.
//!
//! A [`Listing`] is an immutable row loaded from a listings snapshot. Derived
//! values (distance to a query point, zone label) are never written back into
//! it; they are attached by wrapping, e.g. [`NearbyListing`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default search radius in meters.
pub const DEFAULT_RADIUS_M: f64 = 500.0;

/// Decimal places used by [`CoordinateKey`] (about 1.1 m at the equator).
pub const COORDINATE_KEY_DECIMALS: i32 = 5;

/// A WGS84 position in decimal degrees.
///
/// No range validation is performed: out-of-range values are accepted by the
/// distance math and simply have no real-world meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Rounded key suitable for memoising per-coordinate lookups.
    #[must_use]
    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::from_coordinate(*self)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.7}, {:.7})", self.latitude, self.longitude)
    }
}

/// A coordinate rounded to [`COORDINATE_KEY_DECIMALS`] places, stored as
/// scaled integers so it can be ordered and compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordinateKey {
    lat_e5: i64,
    lon_e5: i64,
}

impl CoordinateKey {
    /// Builds a key by rounding both components.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        let scale = 10_f64.powi(COORDINATE_KEY_DECIMALS);
        Self {
            lat_e5: (coordinate.latitude * scale).round() as i64,
            lon_e5: (coordinate.longitude * scale).round() as i64,
        }
    }
}

/// A real-estate listing as loaded from the data source.
///
/// Every field except the coordinate may be missing in source data. A listing
/// without a coordinate is kept in the snapshot (it still counts toward
/// aggregates keyed on non-spatial fields) but is skipped by anything that
/// needs a distance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Client / owner name.
    pub client_name: Option<String>,
    /// Asking price.
    pub price: Option<f64>,
    /// Built area in square meters.
    pub area_m2: Option<f64>,
    /// Number of bedrooms.
    pub bedrooms: Option<u32>,
    /// Number of bathrooms.
    pub bathrooms: Option<u32>,
    /// Location. `None` when the source row lacked a usable position.
    pub coordinate: Option<Coordinate>,
    /// Any additional source columns, keyed by normalized header name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Listing {
    /// Returns the coordinate only if it is present and finite.
    #[must_use]
    pub fn usable_coordinate(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_finite)
    }
}

/// A proximity query: a center point and a radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Point to search around.
    pub center: Coordinate,
    /// Inclusive search radius in meters.
    pub radius_m: f64,
}

impl Query {
    /// Creates a query with the [`DEFAULT_RADIUS_M`] radius.
    #[must_use]
    pub const fn new(center: Coordinate) -> Self {
        Self {
            center,
            radius_m: DEFAULT_RADIUS_M,
        }
    }

    /// Returns a copy of this query with a different radius.
    #[must_use]
    pub const fn with_radius(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }
}

/// A listing found within a query radius, paired with its distance.
///
/// Borrows the listing from the snapshot it was found in; the output of a
/// radius search is a subset of its input by identity.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyListing<'a> {
    /// The matched listing.
    #[serde(flatten)]
    pub listing: &'a Listing,
    /// Position of the listing in the searched sequence.
    #[serde(skip)]
    pub index: usize,
    /// Distance from the query center in meters.
    pub distance_m: f64,
}
