//! Immutable listing snapshots and the store that swaps them.
//!
//! Everything derived from a snapshot (zone labels, reverse-geocoded
//! localities) is cached inside that snapshot. Replacing the snapshot in the
//! [`SnapshotStore`] therefore drops every derived cache in one step, and a
//! computation holding an `Arc<Snapshot>` keeps seeing one consistent set of
//! listings until it finishes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use nearby_geocoder::{Locality, ReverseGeocoder, resolve_locality};
use nearby_listing_models::{Coordinate, CoordinateKey, Listing};
use nearby_zones::ZoneStrategy;

/// Zone label per listing, index-aligned with [`Snapshot::listings`].
/// `None` for listings without a usable coordinate.
pub type ZoneLabels = Arc<[Option<String>]>;

/// A read-only set of listings plus memoised derived data.
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    listings: Vec<Listing>,
    zones: Mutex<BTreeMap<ZoneStrategy, ZoneLabels>>,
    localities: tokio::sync::Mutex<BTreeMap<CoordinateKey, Locality>>,
}

impl Snapshot {
    /// Wraps `listings` as snapshot number `generation`.
    #[must_use]
    pub fn new(generation: u64, listings: Vec<Listing>) -> Self {
        Self {
            generation,
            listings,
            zones: Mutex::new(BTreeMap::new()),
            localities: tokio::sync::Mutex::new(BTreeMap::new()),
        }
    }

    /// Monotonic identifier of this snapshot within its store.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The listings, in source order.
    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Zone labels for every listing under `strategy`, computed on first
    /// use and cached for the life of the snapshot.
    pub fn zones(&self, strategy: ZoneStrategy) -> ZoneLabels {
        let mut cache = self.zones.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(strategy).or_insert_with(|| {
            log::debug!(
                "Assigning {strategy} zones to {} listings (snapshot {})",
                self.listings.len(),
                self.generation
            );
            self.listings
                .iter()
                .map(|l| l.usable_coordinate().map(|c| strategy.classify(c)))
                .collect()
        }))
    }

    /// Locality of `coordinate`, looked up at most once per rounded
    /// coordinate for the life of the snapshot.
    ///
    /// The cache lock is held across the lookup so concurrent callers for
    /// the same point wait for the first answer instead of issuing a second
    /// request.
    pub async fn locality(
        &self,
        geocoder: &dyn ReverseGeocoder,
        coordinate: Coordinate,
    ) -> Locality {
        let key = coordinate.key();
        let mut cache = self.localities.lock().await;
        if let Some(hit) = cache.get(&key) {
            log::trace!("Locality cache hit for {coordinate}");
            return hit.clone();
        }

        let locality = resolve_locality(geocoder, coordinate).await;
        cache.insert(key, locality.clone());
        locality
    }
}

/// Holds the current snapshot and replaces it wholesale on reload.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
    next_generation: AtomicU64,
}

impl SnapshotStore {
    /// Creates a store whose first snapshot (generation 1) holds `listings`.
    #[must_use]
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::new(1, listings))),
            next_generation: AtomicU64::new(2),
        }
    }

    /// The current snapshot. Callers keep using it even if the store is
    /// reloaded meanwhile.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs `listings` as a new snapshot, discarding every cache tied to
    /// the previous one, and returns it.
    pub fn replace(&self, listings: Vec<Listing>) -> Arc<Snapshot> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let snapshot = Arc::new(Snapshot::new(generation, listings));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        log::info!(
            "Installed snapshot {generation} with {} listings",
            snapshot.listings.len()
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use nearby_geocoder::GeocodeError;

    use super::*;

    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReverseGeocoder for CountingGeocoder {
        async fn reverse(&self, _coordinate: Coordinate) -> Result<Option<String>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some("Bogotá".to_string()))
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        async fn reverse(&self, _coordinate: Coordinate) -> Result<Option<String>, GeocodeError> {
            Err(GeocodeError::RateLimited)
        }
    }

    fn at(lat: f64, lon: f64) -> Listing {
        Listing {
            coordinate: Some(Coordinate::new(lat, lon)),
            ..Listing::default()
        }
    }

    #[test]
    fn zones_are_index_aligned_and_cached() {
        let snapshot = Snapshot::new(1, vec![at(4.65, -74.1), Listing::default(), at(0.0, 0.0)]);

        let first = snapshot.zones(ZoneStrategy::CityBoxes);
        assert_eq!(
            first.as_ref(),
            &[Some("Bogotá".to_string()), None, Some("Other".to_string())]
        );

        let second = snapshot.zones(ZoneStrategy::CityBoxes);
        assert!(Arc::ptr_eq(&first, &second));

        let buckets = snapshot.zones(ZoneStrategy::Bucket2);
        assert_eq!(buckets[0].as_deref(), Some("4.65,-74.10"));
    }

    #[tokio::test]
    async fn locality_is_looked_up_once_per_point() {
        let snapshot = Snapshot::new(1, Vec::new());
        let geocoder = CountingGeocoder::default();

        let a = snapshot
            .locality(&geocoder, Coordinate::new(4.5997, -74.0817))
            .await;
        let b = snapshot
            .locality(&geocoder, Coordinate::new(4.599_700_4, -74.081_700_3))
            .await;
        let _ = snapshot
            .locality(&geocoder, Coordinate::new(6.25, -75.56))
            .await;

        assert_eq!(a, Locality::Resolved("Bogotá".to_string()));
        assert_eq!(a, b);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_lookup_is_cached_as_unavailable() {
        let snapshot = Snapshot::new(1, Vec::new());
        let point = Coordinate::new(4.5997, -74.0817);

        let locality = snapshot.locality(&FailingGeocoder, point).await;
        assert!(matches!(locality, Locality::Unavailable(_)));

        // A later lookup in the same snapshot reuses the cached outcome.
        let geocoder = CountingGeocoder::default();
        let again = snapshot.locality(&geocoder, point).await;
        assert_eq!(again, locality);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn replacing_the_snapshot_drops_all_caches() {
        let store = SnapshotStore::new(vec![at(4.65, -74.1)]);
        let geocoder = CountingGeocoder::default();
        let point = Coordinate::new(4.5997, -74.0817);

        let old = store.current();
        let old_zones = old.zones(ZoneStrategy::CityBoxes);
        old.locality(&geocoder, point).await;

        let new = store.replace(vec![at(6.25, -75.56), at(3.45, -76.53)]);
        assert_eq!(new.generation(), old.generation() + 1);
        assert!(Arc::ptr_eq(&new, &store.current()));

        let new_zones = new.zones(ZoneStrategy::CityBoxes);
        assert_eq!(new_zones.len(), 2);
        assert_eq!(new_zones[0].as_deref(), Some("Medellín"));
        new.locality(&geocoder, point).await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);

        // The old snapshot is untouched for anyone still holding it.
        assert_eq!(old.listings().len(), 1);
        assert_eq!(old_zones[0].as_deref(), Some("Bogotá"));
    }
}
