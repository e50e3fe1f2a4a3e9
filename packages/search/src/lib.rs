#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Radius filter over a listing snapshot.
//!
//! A linear scan: every listing with a usable coordinate is measured against
//! the query center and kept iff its distance is `<=` the radius. The result
//! borrows from the input, preserves input order unless a distance sort is
//! requested, and reports how many listings were skipped for lacking a
//! coordinate. Nothing in here fails; an empty input yields an empty result.

use nearby_distance::DistanceFormula;
use nearby_listing_models::{Listing, NearbyListing, Query};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Output ordering for radius search results.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortOrder {
    /// Same order as the input.
    #[default]
    Input,
    /// Nearest first; equal distances keep input order.
    Distance,
}

/// Tunables for a radius search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Distance formula used for every comparison.
    pub formula: DistanceFormula,
    /// Output ordering.
    pub sort: SortOrder,
}

/// Listings found within a radius plus scan diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusResult<'a> {
    /// Matching listings with their distances.
    pub matches: Vec<NearbyListing<'a>>,
    /// Listings examined.
    pub scanned: usize,
    /// Listings excluded because they had no usable coordinate.
    pub skipped: usize,
}

impl RadiusResult<'_> {
    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Filters `listings` to those within `query.radius_m` of `query.center`
/// using haversine distance and input order.
#[must_use]
pub fn filter_within_radius<'a, I>(query: &Query, listings: I) -> RadiusResult<'a>
where
    I: IntoIterator<Item = &'a Listing>,
{
    filter_within_radius_with(query, listings, SearchOptions::default())
}

/// Like [`filter_within_radius`] with an explicit formula and ordering.
#[must_use]
pub fn filter_within_radius_with<'a, I>(
    query: &Query,
    listings: I,
    options: SearchOptions,
) -> RadiusResult<'a>
where
    I: IntoIterator<Item = &'a Listing>,
{
    if query.radius_m.is_nan() || query.radius_m < 0.0 {
        log::warn!(
            "Radius {} m cannot match anything; returning no results",
            query.radius_m
        );
    }

    let mut result = RadiusResult::default();

    for (index, listing) in listings.into_iter().enumerate() {
        result.scanned += 1;

        let Some(coordinate) = listing.usable_coordinate() else {
            result.skipped += 1;
            continue;
        };

        let distance_m = options.formula.distance(query.center, coordinate);
        if distance_m <= query.radius_m {
            result.matches.push(NearbyListing {
                listing,
                index,
                distance_m,
            });
        }
    }

    if options.sort == SortOrder::Distance {
        // sort_by is stable, so ties keep input order.
        result
            .matches
            .sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    }

    log::debug!(
        "Radius search around {} ({} m, {}): {} of {} listings matched, {} skipped",
        query.center,
        query.radius_m,
        options.formula,
        result.matches.len(),
        result.scanned,
        result.skipped,
    );

    result
}

#[cfg(test)]
mod tests {
    use nearby_distance::{EARTH_RADIUS_KM, distance};
    use nearby_listing_models::Coordinate;

    use super::*;

    const CENTER: Coordinate = Coordinate::new(4.5997, -74.0817);

    fn listing_at(latitude: f64, longitude: f64) -> Listing {
        Listing {
            coordinate: Some(Coordinate::new(latitude, longitude)),
            ..Listing::default()
        }
    }

    /// A point `meters` due north of [`CENTER`].
    fn north_of_center(meters: f64) -> Listing {
        let delta = (meters / (EARTH_RADIUS_KM * 1_000.0)).to_degrees();
        listing_at(CENTER.latitude + delta, CENTER.longitude)
    }

    #[test]
    fn includes_listing_at_query_point() {
        let listings = vec![listing_at(4.5997, -74.0817)];
        let result = filter_within_radius(&Query::new(CENTER), &listings);

        assert_eq!(result.matches.len(), 1);
        assert!(result.matches[0].distance_m.abs() < 1e-6);
    }

    #[test]
    fn excludes_listing_5_6_km_away() {
        let listings = vec![listing_at(4.6500, -74.0817)];
        let result = filter_within_radius(&Query::new(CENTER), &listings);

        assert!(result.is_empty());
        assert_eq!(result.scanned, 1);
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn boundary_is_inclusive() {
        let on_edge = north_of_center(500.0);
        let beyond = north_of_center(500.1);
        let edge_distance = distance(CENTER, on_edge.coordinate.unwrap());
        assert!((edge_distance - 500.0).abs() < 1e-6);

        let listings = vec![on_edge, beyond];
        let query = Query::new(CENTER).with_radius(edge_distance);
        let result = filter_within_radius(&query, &listings);

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].index, 0);
        assert!(std::ptr::eq(result.matches[0].listing, &listings[0]));
    }

    #[test]
    fn skips_and_counts_missing_coordinates() {
        let listings = vec![
            Listing::default(),
            listing_at(4.5998, -74.0816),
            listing_at(f64::NAN, -74.0817),
            Listing::default(),
        ];
        let result = filter_within_radius(&Query::new(CENTER), &listings);

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].index, 1);
        assert_eq!(result.scanned, 4);
        assert_eq!(result.skipped, 3);
    }

    #[test]
    fn output_is_a_subset_within_radius() {
        let listings: Vec<Listing> = (0..40)
            .map(|i| north_of_center(f64::from(i) * 25.0))
            .collect();
        let query = Query::new(CENTER);
        let result = filter_within_radius(&query, &listings);

        assert!(!result.is_empty());
        for m in &result.matches {
            assert!(m.distance_m <= query.radius_m);
            assert!(listings.iter().any(|l| std::ptr::eq(l, m.listing)));
        }
    }

    #[test]
    fn preserves_input_order_by_default() {
        let listings = vec![north_of_center(300.0), north_of_center(100.0), north_of_center(200.0)];
        let result = filter_within_radius(&Query::new(CENTER), &listings);

        let order: Vec<usize> = result
            .matches
            .iter()
            .map(|m| {
                listings
                    .iter()
                    .position(|l| std::ptr::eq(l, m.listing))
                    .unwrap()
            })
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn distance_sort_is_stable() {
        let mut first = north_of_center(100.0);
        first.client_name = Some("first".to_string());
        let mut second = north_of_center(100.0);
        second.client_name = Some("second".to_string());
        let listings = vec![north_of_center(300.0), first, north_of_center(50.0), second];

        let options = SearchOptions {
            sort: SortOrder::Distance,
            ..SearchOptions::default()
        };
        let result = filter_within_radius_with(&Query::new(CENTER), &listings, options);

        let names: Vec<Option<&str>> = result
            .matches
            .iter()
            .map(|m| m.listing.client_name.as_deref())
            .collect();
        assert_eq!(names, vec![None, Some("first"), Some("second"), None]);
        assert!(result.matches[0].distance_m < result.matches[1].distance_m);
        assert!(result.matches[2].distance_m < result.matches[3].distance_m);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let listings: Vec<Listing> = (0..10)
            .map(|i| north_of_center(f64::from(i) * 70.0))
            .collect();
        let query = Query::new(CENTER);

        let a = filter_within_radius(&query, &listings);
        let b = filter_within_radius(&query, &listings);

        assert_eq!(a.matches.len(), b.matches.len());
        for (x, y) in a.matches.iter().zip(&b.matches) {
            assert!(std::ptr::eq(x.listing, y.listing));
            assert!((x.distance_m - y.distance_m).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn geodesic_formula_is_selectable() {
        let listings = vec![north_of_center(200.0)];
        let options = SearchOptions {
            formula: DistanceFormula::Geodesic,
            ..SearchOptions::default()
        };
        let result = filter_within_radius_with(&Query::new(CENTER), &listings, options);

        assert_eq!(result.matches.len(), 1);
        assert!((result.matches[0].distance_m - 200.0).abs() < 2.0);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let listings: Vec<Listing> = Vec::new();
        let result = filter_within_radius(&Query::new(CENTER), &listings);

        assert!(result.is_empty());
        assert_eq!(result.scanned, 0);
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn negative_radius_matches_nothing() {
        let listings = vec![listing_at(4.5997, -74.0817)];
        let query = Query::new(CENTER).with_radius(-1.0);
        assert!(filter_within_radius(&query, &listings).is_empty());
    }
}
