//! Named city bounding boxes.
//!
//! The built-in table is embedded at compile time from `cities/*.toml` and
//! parsed once. Custom tables can be loaded with [`CityTable::from_toml`].
//! Bounds are inclusive and the first matching box wins, so overlapping
//! boxes resolve deterministically by file order.

use std::sync::LazyLock;

use nearby_listing_models::Coordinate;
use serde::Deserialize;

use crate::{OTHER_ZONE, ZoneClassifier, ZoneTableError};

/// A named axis-aligned latitude/longitude box.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityBox {
    /// City name returned on a match.
    pub name: String,
    /// Southern bound in degrees.
    pub lat_min: f64,
    /// Northern bound in degrees.
    pub lat_max: f64,
    /// Western bound in degrees.
    pub lon_min: f64,
    /// Eastern bound in degrees.
    pub lon_max: f64,
}

impl CityBox {
    /// Whether `coordinate` lies inside this box (bounds inclusive).
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&coordinate.latitude)
            && (self.lon_min..=self.lon_max).contains(&coordinate.longitude)
    }

    fn validate(&self) -> Result<(), ZoneTableError> {
        let invalid = |message: &str| ZoneTableError::InvalidBox {
            name: self.name.clone(),
            message: message.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if ![self.lat_min, self.lat_max, self.lon_min, self.lon_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(invalid("bounds must be finite"));
        }
        if self.lat_min > self.lat_max {
            return Err(invalid("lat_min is greater than lat_max"));
        }
        if self.lon_min > self.lon_max {
            return Err(invalid("lon_min is greater than lon_max"));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CityTableFile {
    #[serde(default)]
    city: Vec<CityBox>,
}

/// An ordered list of city boxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityTable {
    cities: Vec<CityBox>,
}

// ── Compile-time embedded TOML files ────────────────────────────────

const CITY_TOMLS: &[(&str, &str)] = &[("colombia", include_str!("../cities/colombia.toml"))];

static BUILTIN: LazyLock<CityTable> = LazyLock::new(|| {
    let mut cities = Vec::new();
    for (name, toml_str) in CITY_TOMLS {
        let table = CityTable::from_toml(toml_str)
            .unwrap_or_else(|e| panic!("Failed to parse city table '{name}': {e}"));
        cities.extend(table.cities);
    }
    log::debug!("Loaded {} built-in city boxes", cities.len());
    CityTable { cities }
});

impl CityTable {
    /// Builds a table from boxes, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneTableError::InvalidBox`] for an empty name, non-finite
    /// bounds, or inverted bounds.
    pub fn new(cities: Vec<CityBox>) -> Result<Self, ZoneTableError> {
        for city in &cities {
            city.validate()?;
        }
        Ok(Self { cities })
    }

    /// Parses a table from a TOML document of `[[city]]` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneTableError`] if the document is malformed or a box is
    /// invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self, ZoneTableError> {
        let file: CityTableFile = toml::de::from_str(toml_str)?;
        Self::new(file.city)
    }

    /// The embedded table of Colombian metro areas.
    ///
    /// # Panics
    ///
    /// Panics if an embedded TOML file is malformed (these are fixed at
    /// compile time and covered by tests).
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// The boxes in lookup order.
    #[must_use]
    pub fn cities(&self) -> &[CityBox] {
        &self.cities
    }

    /// Name of the first box containing `coordinate`, if any.
    #[must_use]
    pub fn lookup(&self, coordinate: Coordinate) -> Option<&str> {
        self.cities
            .iter()
            .find(|city| city.contains(coordinate))
            .map(|city| city.name.as_str())
    }
}

impl ZoneClassifier for CityTable {
    fn classify(&self, coordinate: Coordinate) -> String {
        self.lookup(coordinate).unwrap_or(OTHER_ZONE).to_string()
    }
}
