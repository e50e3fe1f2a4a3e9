#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding of a query point to a locality name.
//!
//! This is a network collaborator, not part of the proximity core. It is
//! rate limited, can fail in many ways, and is only ever asked about the
//! query point (never about each listing). Callers get an explicit
//! [`Locality`] outcome and decide how to display failures; the sentinel
//! [`UNKNOWN_CITY`] is applied only at the presentation boundary.
//!
//! Providers are configured through the [`service_registry`].

pub mod nominatim;
pub mod rate_limit;
pub mod service_registry;

use async_trait::async_trait;
use nearby_listing_models::Coordinate;
use serde::Serialize;
use thiserror::Error;

/// Display fallback for a locality that could not be resolved.
pub const UNKNOWN_CITY: &str = "Unknown city";

/// Errors from reverse geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (connection, timeout, non-success status).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves a coordinate to a locality name.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the locality containing `coordinate`.
    ///
    /// Returns `Ok(None)` when the service answered but knows no locality
    /// there.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the lookup could not be completed.
    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, GeocodeError>;
}

/// Outcome of a reverse geocoding lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Locality {
    /// The service returned a locality name.
    Resolved(String),
    /// The service answered but had no locality for the point.
    NotFound,
    /// The lookup failed; carries the reason.
    Unavailable(String),
}

impl Locality {
    /// Collapses a lookup result into an outcome.
    #[must_use]
    pub fn from_result(result: Result<Option<String>, GeocodeError>) -> Self {
        match result {
            Ok(Some(name)) => Self::Resolved(name),
            Ok(None) => Self::NotFound,
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    /// The resolved name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Resolved(name) => Some(name),
            Self::NotFound | Self::Unavailable(_) => None,
        }
    }

    /// The resolved name, or `fallback` for any other outcome.
    #[must_use]
    pub fn display_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name().unwrap_or(fallback)
    }
}

/// Runs one lookup and never fails: errors become
/// [`Locality::Unavailable`] and are logged.
pub async fn resolve_locality(geocoder: &dyn ReverseGeocoder, coordinate: Coordinate) -> Locality {
    let result = geocoder.reverse(coordinate).await;
    if let Err(e) = &result {
        log::warn!("Reverse geocoding failed for {coordinate}: {e}");
    }
    Locality::from_result(result)
}
