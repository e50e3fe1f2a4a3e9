//! Search requests and the reports built from them.

use nearby_aggregate::{AggregateOptions, Aggregation, aggregate_with};
use nearby_geocoder::{Locality, ReverseGeocoder};
use nearby_listing_models::{NearbyListing, Query};
use nearby_search::{SearchOptions, filter_within_radius_with};
use nearby_zones::ZoneStrategy;
use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Everything needed to run one search against a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Center point and radius.
    pub query: Query,
    /// Distance formula and result order.
    #[serde(default)]
    pub options: SearchOptions,
    /// Label each match with a zone and aggregate the neighborhood by it.
    #[serde(default)]
    pub zone_strategy: Option<ZoneStrategy>,
    /// Reverse geocode the query point.
    #[serde(default)]
    pub resolve_locality: bool,
}

impl SearchRequest {
    /// A plain radius search: no zones, no geocoding.
    #[must_use]
    pub fn new(query: Query) -> Self {
        Self {
            query,
            options: SearchOptions::default(),
            zone_strategy: None,
            resolve_locality: false,
        }
    }
}

/// A match with its zone label attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonedMatch<'a> {
    /// The matched listing and its distance.
    #[serde(flatten)]
    pub nearby: NearbyListing<'a>,
    /// Zone label, when a zone strategy was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Result of [`Snapshot::search`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport<'a> {
    /// Snapshot the search ran against.
    pub generation: u64,
    /// The query as run.
    pub query: Query,
    /// Locality of the query point, when requested and a geocoder was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<Locality>,
    /// Listings within the radius, in the requested order.
    pub matches: Vec<ZonedMatch<'a>>,
    /// Listings examined.
    pub scanned: usize,
    /// Listings excluded for lacking a usable coordinate.
    pub skipped: usize,
    /// Matches grouped by zone. Empty unless a zone strategy was requested.
    pub zones: Aggregation<String>,
}

impl SearchReport<'_> {
    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl Snapshot {
    /// Runs `request` against this snapshot.
    ///
    /// The locality lookup only happens when `request.resolve_locality` is
    /// set and a geocoder is supplied; its failure never fails the search.
    pub async fn search<'s>(
        &'s self,
        request: &SearchRequest,
        geocoder: Option<&dyn ReverseGeocoder>,
    ) -> SearchReport<'s> {
        let found = filter_within_radius_with(&request.query, self.listings(), request.options);

        let labels = request.zone_strategy.map(|strategy| self.zones(strategy));

        let matches: Vec<ZonedMatch<'s>> = found
            .matches
            .into_iter()
            .map(|nearby| ZonedMatch {
                zone: labels
                    .as_ref()
                    .and_then(|labels| labels.get(nearby.index).cloned().flatten()),
                nearby,
            })
            .collect();

        let zones = if labels.is_some() {
            let mut zone_of = matches.iter().map(|m| m.zone.clone());
            aggregate_with(
                matches.iter().map(|m| m.nearby.listing),
                |_| zone_of.next().flatten(),
                AggregateOptions::default(),
            )
        } else {
            Aggregation::default()
        };

        let locality = match geocoder {
            Some(geocoder) if request.resolve_locality => {
                Some(self.locality(geocoder, request.query.center).await)
            }
            _ => None,
        };

        SearchReport {
            generation: self.generation(),
            query: request.query,
            locality,
            matches,
            scanned: found.scanned,
            skipped: found.skipped,
            zones,
        }
    }

    /// Aggregates the whole snapshot by zone.
    ///
    /// Listings without a usable coordinate are counted in
    /// [`Aggregation::unkeyed`].
    #[must_use]
    pub fn zone_summary(
        &self,
        strategy: ZoneStrategy,
        options: AggregateOptions,
    ) -> Aggregation<String> {
        let labels = self.zones(strategy);
        let mut zone_of = labels.iter().cloned();
        aggregate_with(self.listings(), |_| zone_of.next().flatten(), options)
    }
}
