use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::engine::cache::ResultCache;
use crate::engine::estimate::DeliveryEstimator;
use crate::engine::proximity::ProximityIndex;
use crate::engine::zones::ZoneResolver;
use crate::geocoding::{GeocodingProvider, MockGeocoder};
use crate::models::location::LocationRecord;
use crate::observability::metrics::Metrics;
use crate::store::{
    CacheStore, InMemoryCacheStore, InMemoryLocationStore, InMemoryZoneStore, LocationStore,
    ZoneStore,
};

pub struct AppState {
    pub config: Config,
    pub locations: ProximityIndex,
    pub zone_store: Arc<dyn ZoneStore>,
    pub estimator: DeliveryEstimator,
    pub cache: ResultCache,
    pub geocoder: Arc<dyn GeocodingProvider>,
    pub driver_events_tx: broadcast::Sender<LocationRecord>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let cache_store = Arc::new(InMemoryCacheStore::new(config.cache.max_entries));
        Self::with_collaborators(
            config,
            Arc::new(InMemoryLocationStore::new()),
            Arc::new(InMemoryZoneStore::new()),
            cache_store,
            Arc::new(MockGeocoder),
        )
    }

    pub fn with_collaborators(
        config: Config,
        location_store: Arc<dyn LocationStore>,
        zone_store: Arc<dyn ZoneStore>,
        cache_store: Arc<dyn CacheStore>,
        geocoder: Arc<dyn GeocodingProvider>,
    ) -> Self {
        let metrics = Metrics::new();
        let (driver_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        let locations = ProximityIndex::new(location_store, config.location.max_search_radius_km);
        let zones = ZoneResolver::new(zone_store.clone());
        let estimator = DeliveryEstimator::new(zones);
        let cache = ResultCache::new(cache_store, config.cache.ttl, metrics.clone());

        Self {
            config,
            locations,
            zone_store,
            estimator,
            cache,
            geocoder,
            driver_events_tx,
            metrics,
        }
    }
}
