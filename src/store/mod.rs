pub mod cache;
pub mod memory;

use thiserror::Error;
use uuid::Uuid;

use crate::models::location::{LocationKind, LocationRecord};
use crate::models::point::GeoPoint;
use crate::models::zone::DeliveryZone;

pub use cache::{CacheError, CacheStore, InMemoryCacheStore};
pub use memory::{InMemoryLocationStore, InMemoryZoneStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait LocationStore: Send + Sync {
    /// Replaces any record with the same `(kind, owner_id)` and returns what
    /// is stored afterwards. A write older than the stored record is ignored.
    fn upsert(&self, record: LocationRecord) -> Result<LocationRecord, StoreError>;

    /// Stores `record` only if no record with the same `(kind, owner_id)`
    /// exists. Returns `None` when one does.
    fn insert(&self, record: LocationRecord) -> Result<Option<LocationRecord>, StoreError>;

    fn get(&self, kind: LocationKind, owner_id: &str)
    -> Result<Option<LocationRecord>, StoreError>;

    /// Returns `true` when a record was removed.
    fn delete(&self, kind: LocationKind, owner_id: &str) -> Result<bool, StoreError>;

    /// Records of `kind` within `max_distance_m` of `center`, nearest first.
    fn near(
        &self,
        kind: LocationKind,
        center: &GeoPoint,
        max_distance_m: f64,
    ) -> Result<Vec<LocationRecord>, StoreError>;

    fn count(&self, kind: LocationKind) -> usize;
}

pub trait ZoneStore: Send + Sync {
    fn insert(&self, zone: DeliveryZone) -> Result<(), StoreError>;

    fn get(&self, zone_id: Uuid) -> Result<Option<DeliveryZone>, StoreError>;

    /// Replaces the zone with the same id, keeping its position in store
    /// order. Returns `false` when no such zone exists.
    fn update(&self, zone: DeliveryZone) -> Result<bool, StoreError>;

    fn delete(&self, zone_id: Uuid) -> Result<bool, StoreError>;

    /// Zones of a restaurant in store order.
    fn zones_for(&self, restaurant_id: &str) -> Result<Vec<DeliveryZone>, StoreError>;

    fn count(&self) -> usize;
}
