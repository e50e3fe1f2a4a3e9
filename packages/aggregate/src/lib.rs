#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grouped price and area statistics.
//!
//! [`aggregate`] groups listings by a caller-supplied key (zone label,
//! rounded-coordinate bucket, anything `Ord`) and reports per-group counts
//! and means. A listing with no price still counts toward its group; it is
//! only left out of the price mean. Groups where no listing had a price
//! report `mean_price: None` rather than dividing by zero.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use nearby_listing_models::Listing;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow<K> {
    /// Group key.
    pub key: K,
    /// Listings in the group.
    pub count: usize,
    /// Listings in the group that had a price.
    pub priced_count: usize,
    /// Mean price over priced listings.
    pub mean_price: Option<f64>,
    /// Lowest price in the group.
    pub min_price: Option<f64>,
    /// Highest price in the group.
    pub max_price: Option<f64>,
    /// Mean area over listings that had an area.
    pub mean_area: Option<f64>,
}

/// The rows of one aggregation plus the listings that had no key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation<K> {
    /// One row per distinct key.
    pub rows: Vec<AggregateRow<K>>,
    /// Listings for which the key function returned `None`.
    pub unkeyed: usize,
}

impl<K> Aggregation<K> {
    /// Sum of all row counts.
    #[must_use]
    pub fn keyed_count(&self) -> usize {
        self.rows.iter().map(|row| row.count).sum()
    }
}

impl<K> Default for Aggregation<K> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            unkeyed: 0,
        }
    }
}

/// Row ordering.
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
pub enum AggregateSort {
    /// Key ascending.
    #[default]
    Key,
    /// Mean price descending; groups without a mean come last.
    #[strum(to_string = "price", serialize = "mean_price")]
    #[serde(rename = "price")]
    MeanPriceDesc,
    /// Count descending.
    #[strum(to_string = "count")]
    #[serde(rename = "count")]
    CountDesc,
}

/// Ordering and truncation applied after grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateOptions {
    /// Row ordering. Metric sorts break ties by key ascending.
    pub sort: AggregateSort,
    /// Keep only the first `top` rows after sorting.
    pub top: Option<usize>,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    price_sum: f64,
    priced: usize,
    min_price: Option<f64>,
    max_price: Option<f64>,
    area_sum: f64,
    with_area: usize,
}

impl Accumulator {
    fn push(&mut self, listing: &Listing) {
        self.count += 1;

        if let Some(price) = listing.price.filter(|p| p.is_finite()) {
            self.price_sum += price;
            self.priced += 1;
            self.min_price = Some(self.min_price.map_or(price, |m| m.min(price)));
            self.max_price = Some(self.max_price.map_or(price, |m| m.max(price)));
        }

        if let Some(area) = listing.area_m2.filter(|a| a.is_finite()) {
            self.area_sum += area;
            self.with_area += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish<K>(self, key: K) -> AggregateRow<K> {
        AggregateRow {
            key,
            count: self.count,
            priced_count: self.priced,
            mean_price: (self.priced > 0).then(|| self.price_sum / self.priced as f64),
            min_price: self.min_price,
            max_price: self.max_price,
            mean_area: (self.with_area > 0).then(|| self.area_sum / self.with_area as f64),
        }
    }
}

/// Groups `listings` by `key_fn` with rows in key order.
#[must_use]
pub fn aggregate<'a, K, I, F>(listings: I, key_fn: F) -> Aggregation<K>
where
    K: Ord,
    I: IntoIterator<Item = &'a Listing>,
    F: FnMut(&Listing) -> Option<K>,
{
    aggregate_with(listings, key_fn, AggregateOptions::default())
}

/// Groups `listings` by `key_fn`, then sorts and truncates per `options`.
///
/// `key_fn` is called exactly once per listing, in iteration order.
#[must_use]
pub fn aggregate_with<'a, K, I, F>(
    listings: I,
    mut key_fn: F,
    options: AggregateOptions,
) -> Aggregation<K>
where
    K: Ord,
    I: IntoIterator<Item = &'a Listing>,
    F: FnMut(&Listing) -> Option<K>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    let mut unkeyed = 0;

    for listing in listings {
        match key_fn(listing) {
            Some(key) => groups.entry(key).or_default().push(listing),
            None => unkeyed += 1,
        }
    }

    let mut rows: Vec<AggregateRow<K>> = groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key))
        .collect();

    match options.sort {
        AggregateSort::Key => {}
        AggregateSort::MeanPriceDesc => {
            rows.sort_by(|a, b| {
                let by_price = match (a.mean_price, b.mean_price) {
                    (Some(x), Some(y)) => y.total_cmp(&x),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                by_price.then_with(|| a.key.cmp(&b.key))
            });
        }
        AggregateSort::CountDesc => {
            rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        }
    }

    if let Some(top) = options.top {
        rows.truncate(top);
    }

    log::debug!(
        "Aggregated into {} groups ({} listings without a key)",
        rows.len(),
        unkeyed
    );

    Aggregation { rows, unkeyed }
}

#[cfg(test)]
mod tests {
    use nearby_listing_models::Coordinate;
    use nearby_zones::ZoneStrategy;

    use super::*;

    fn priced(zone: &str, price: Option<f64>) -> Listing {
        let mut listing = Listing {
            price,
            ..Listing::default()
        };
        listing
            .attributes
            .insert("zone".to_string(), zone.to_string());
        listing
    }

    fn by_zone(listing: &Listing) -> Option<String> {
        listing.attributes.get("zone").cloned()
    }

    #[test]
    fn missing_price_counts_but_is_not_averaged() {
        let listings = vec![
            priced("a", Some(100.0)),
            priced("a", Some(200.0)),
            priced("a", None),
        ];
        let result = aggregate(&listings, |_| Some("all"));

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.count, 3);
        assert_eq!(row.priced_count, 2);
        assert!((row.mean_price.unwrap() - 150.0).abs() < f64::EPSILON);
        assert_eq!(row.min_price, Some(100.0));
        assert_eq!(row.max_price, Some(200.0));
    }

    #[test]
    fn group_without_prices_is_kept_with_no_mean() {
        let listings = vec![priced("a", None), priced("a", None), priced("b", Some(5.0))];
        let result = aggregate(&listings, by_zone);

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].key, "a");
        assert_eq!(result.rows[0].count, 2);
        assert!(result.rows[0].mean_price.is_none());
        assert!(result.rows[0].mean_area.is_none());
    }

    #[test]
    fn counts_partition_keyed_listings() {
        let mut listings: Vec<Listing> = ["x", "y", "x", "z", "y", "x"]
            .iter()
            .map(|z| priced(z, Some(1.0)))
            .collect();
        listings.push(Listing::default());
        listings.push(Listing::default());

        let result = aggregate(&listings, by_zone);

        assert_eq!(result.unkeyed, 2);
        assert_eq!(result.keyed_count(), 6);
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
    }

    #[test]
    fn mean_area_ignores_missing_area() {
        let listings = vec![
            Listing {
                area_m2: Some(60.0),
                ..Listing::default()
            },
            Listing {
                area_m2: Some(90.0),
                ..Listing::default()
            },
            Listing::default(),
        ];
        let result = aggregate(&listings, |_| Some(()));

        assert_eq!(result.rows[0].count, 3);
        assert!((result.rows[0].mean_area.unwrap() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_sort_descends_with_key_tiebreak_and_none_last() {
        let listings = vec![
            priced("c", Some(100.0)),
            priced("a", None),
            priced("b", Some(300.0)),
            priced("d", Some(100.0)),
        ];
        let options = AggregateOptions {
            sort: AggregateSort::MeanPriceDesc,
            top: None,
        };
        let result = aggregate_with(&listings, by_zone, options);

        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn top_n_truncates_after_sorting() {
        let listings = vec![
            priced("a", Some(1.0)),
            priced("b", Some(3.0)),
            priced("c", Some(2.0)),
        ];
        let options = AggregateOptions {
            sort: AggregateSort::MeanPriceDesc,
            top: Some(2),
        };
        let result = aggregate_with(&listings, by_zone, options);

        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn count_sort_descends() {
        let listings = vec![
            priced("a", None),
            priced("b", None),
            priced("b", None),
            priced("c", None),
        ];
        let options = AggregateOptions {
            sort: AggregateSort::CountDesc,
            top: None,
        };
        let result = aggregate_with(&listings, by_zone, options);

        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn groups_by_city_zone() {
        let at = |lat: f64, lon: f64, price: f64| Listing {
            price: Some(price),
            coordinate: Some(Coordinate::new(lat, lon)),
            ..Listing::default()
        };
        let listings = vec![
            at(4.65, -74.1, 400.0),
            at(4.60, -74.08, 200.0),
            at(6.25, -75.56, 300.0),
            Listing::default(),
        ];
        let result = aggregate(&listings, |l| {
            l.usable_coordinate()
                .map(|c| ZoneStrategy::CityBoxes.classify(c))
        });

        assert_eq!(result.unkeyed, 1);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].key, "Bogotá");
        assert_eq!(result.rows[0].count, 2);
        assert!((result.rows[0].mean_price.unwrap() - 300.0).abs() < f64::EPSILON);
        assert_eq!(result.rows[1].key, "Medellín");
    }

    #[test]
    fn empty_input_yields_no_rows() {
        let listings: Vec<Listing> = Vec::new();
        let result = aggregate(&listings, by_zone);

        assert!(result.rows.is_empty());
        assert_eq!(result.unkeyed, 0);
    }

    #[test]
    fn sort_names_parse() {
        assert_eq!(
            "price".parse::<AggregateSort>().unwrap(),
            AggregateSort::MeanPriceDesc
        );
        assert_eq!(
            "count".parse::<AggregateSort>().unwrap(),
            AggregateSort::CountDesc
        );
        assert_eq!("key".parse::<AggregateSort>().unwrap(), AggregateSort::Key);
    }
}
