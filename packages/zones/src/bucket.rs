//! Coordinate-bucket zones.
//!
//! Rounds latitude and longitude independently and joins them into a key
//! such as `"4.60,-74.08"`. This is a neighborhood proxy, not an
//! administrative boundary.

use nearby_listing_models::Coordinate;

use crate::ZoneClassifier;

/// Largest supported rounding precision.
pub const MAX_DECIMALS: u8 = 6;

/// Buckets coordinates by rounding to a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateBuckets {
    decimals: u8,
}

impl CoordinateBuckets {
    /// Creates a bucketer rounding to `decimals` places (clamped to
    /// [`MAX_DECIMALS`]).
    #[must_use]
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals.min(MAX_DECIMALS),
        }
    }

    /// The rounding precision in decimal places.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }
}

impl ZoneClassifier for CoordinateBuckets {
    fn classify(&self, coordinate: Coordinate) -> String {
        bucket_key(coordinate, self.decimals)
    }
}

/// Builds the bucket key for `coordinate` at `decimals` places.
#[must_use]
pub fn bucket_key(coordinate: Coordinate, decimals: u8) -> String {
    let precision = usize::from(decimals);
    format!(
        "{:.precision$},{:.precision$}",
        round_to(coordinate.latitude, decimals),
        round_to(coordinate.longitude, decimals),
    )
}

fn round_to(value: f64, decimals: u8) -> f64 {
    let scale = 10_f64.powi(i32::from(decimals));
    // Adding 0.0 turns -0.0 into 0.0 so "-0.00" never appears in keys.
    (value * scale).round() / scale + 0.0
}
