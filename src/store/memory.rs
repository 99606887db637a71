use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::geo::haversine_km;
use crate::models::location::{LocationKind, LocationRecord};
use crate::models::point::GeoPoint;
use crate::models::zone::DeliveryZone;
use crate::store::{LocationStore, StoreError, ZoneStore};

#[derive(Default)]
pub struct InMemoryLocationStore {
    restaurants: DashMap<String, LocationRecord>,
    drivers: DashMap<String, LocationRecord>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, kind: LocationKind) -> &DashMap<String, LocationRecord> {
        match kind {
            LocationKind::Restaurant => &self.restaurants,
            LocationKind::Driver => &self.drivers,
        }
    }
}

impl LocationStore for InMemoryLocationStore {
    fn upsert(&self, mut record: LocationRecord) -> Result<LocationRecord, StoreError> {
        let collection = self.collection(record.kind);
        let mut entry = collection
            .entry(record.owner_id.clone())
            .or_insert_with(|| record.clone());

        if record.last_updated < entry.last_updated {
            return Ok(entry.clone());
        }

        record.created_at = entry.created_at.min(record.created_at);
        *entry = record;
        Ok(entry.clone())
    }

    fn insert(&self, record: LocationRecord) -> Result<Option<LocationRecord>, StoreError> {
        match self.collection(record.kind).entry(record.owner_id.clone()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => Ok(Some(slot.insert(record).clone())),
        }
    }

    fn get(
        &self,
        kind: LocationKind,
        owner_id: &str,
    ) -> Result<Option<LocationRecord>, StoreError> {
        Ok(self
            .collection(kind)
            .get(owner_id)
            .map(|entry| entry.value().clone()))
    }

    fn delete(&self, kind: LocationKind, owner_id: &str) -> Result<bool, StoreError> {
        Ok(self.collection(kind).remove(owner_id).is_some())
    }

    fn near(
        &self,
        kind: LocationKind,
        center: &GeoPoint,
        max_distance_m: f64,
    ) -> Result<Vec<LocationRecord>, StoreError> {
        let mut matches: Vec<(f64, LocationRecord)> = self
            .collection(kind)
            .iter()
            .filter_map(|entry| {
                let record = entry.value();
                let distance_m = haversine_km(center, &record.location) * 1_000.0;
                (distance_m <= max_distance_m).then(|| (distance_m, record.clone()))
            })
            .collect();

        matches.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(matches.into_iter().map(|(_, record)| record).collect())
    }

    fn count(&self, kind: LocationKind) -> usize {
        self.collection(kind).len()
    }
}

#[derive(Default)]
pub struct InMemoryZoneStore {
    by_restaurant: DashMap<String, Vec<DeliveryZone>>,
    owners: DashMap<Uuid, String>,
}

impl InMemoryZoneStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ZoneStore for InMemoryZoneStore {
    fn insert(&self, zone: DeliveryZone) -> Result<(), StoreError> {
        self.owners.insert(zone.id, zone.restaurant_id.clone());
        self.by_restaurant
            .entry(zone.restaurant_id.clone())
            .or_default()
            .push(zone);
        Ok(())
    }

    fn get(&self, zone_id: Uuid) -> Result<Option<DeliveryZone>, StoreError> {
        let Some(owner) = self.owners.get(&zone_id).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };

        Ok(self.by_restaurant.get(&owner).and_then(|zones| {
            zones.iter().find(|zone| zone.id == zone_id).cloned()
        }))
    }

    fn update(&self, zone: DeliveryZone) -> Result<bool, StoreError> {
        let Some(owner) = self.owners.get(&zone.id).map(|entry| entry.value().clone()) else {
            return Ok(false);
        };

        if owner != zone.restaurant_id {
            // Moving a zone to another restaurant appends it to that restaurant's list.
            self.delete(zone.id)?;
            self.insert(zone)?;
            return Ok(true);
        }

        let Some(mut zones) = self.by_restaurant.get_mut(&owner) else {
            return Ok(false);
        };
        match zones.iter_mut().find(|existing| existing.id == zone.id) {
            Some(existing) => {
                *existing = zone;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, zone_id: Uuid) -> Result<bool, StoreError> {
        let Some((_, owner)) = self.owners.remove(&zone_id) else {
            return Ok(false);
        };

        if let Some(mut zones) = self.by_restaurant.get_mut(&owner) {
            zones.retain(|zone| zone.id != zone_id);
        }
        self.by_restaurant.remove_if(&owner, |_, zones| zones.is_empty());
        Ok(true)
    }

    fn zones_for(&self, restaurant_id: &str) -> Result<Vec<DeliveryZone>, StoreError> {
        Ok(self
            .by_restaurant
            .get(restaurant_id)
            .map(|zones| zones.value().clone())
            .unwrap_or_default())
    }

    fn count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::{InMemoryLocationStore, InMemoryZoneStore};
    use crate::models::location::{LocationKind, LocationRecord};
    use crate::models::point::GeoPoint;
    use crate::models::zone::DeliveryZone;
    use crate::store::{LocationStore, ZoneStore};

    fn driver(id: &str, lat: f64, lng: f64) -> LocationRecord {
        LocationRecord::new(LocationKind::Driver, id, GeoPoint::new(lat, lng))
    }

    fn zone(restaurant_id: &str, name: &str) -> DeliveryZone {
        let now = Utc::now();
        DeliveryZone {
            id: Uuid::new_v4(),
            restaurant_id: restaurant_id.to_string(),
            name: name.to_string(),
            boundary: vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(0.0, 1.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(0.0, 0.0),
            ],
            delivery_fee: 2.5,
            minimum_order: 10.0,
            base_estimated_minutes: 20,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn upsert_replaces_record_for_same_owner() {
        let store = InMemoryLocationStore::new();
        store.upsert(driver("d-1", 52.52, 13.40)).unwrap();

        let mut moved = driver("d-1", 52.53, 13.41);
        moved.last_updated = Utc::now() + Duration::seconds(1);
        store.upsert(moved).unwrap();

        assert_eq!(store.count(LocationKind::Driver), 1);
        let stored = store.get(LocationKind::Driver, "d-1").unwrap().unwrap();
        assert_eq!(stored.location, GeoPoint::new(52.53, 13.41));
    }

    #[test]
    fn stale_write_is_ignored() {
        let store = InMemoryLocationStore::new();
        store.upsert(driver("d-1", 52.52, 13.40)).unwrap();

        let mut stale = driver("d-1", 10.0, 10.0);
        stale.last_updated = Utc::now() - Duration::minutes(5);
        let stored = store.upsert(stale).unwrap();

        assert_eq!(stored.location, GeoPoint::new(52.52, 13.40));
    }

    #[test]
    fn insert_keeps_first_record_for_owner() {
        let store = InMemoryLocationStore::new();
        assert!(store.insert(driver("d-1", 1.0, 1.0)).unwrap().is_some());
        assert!(store.insert(driver("d-1", 2.0, 2.0)).unwrap().is_none());

        let stored = store.get(LocationKind::Driver, "d-1").unwrap().unwrap();
        assert_eq!(stored.location, GeoPoint::new(1.0, 1.0));
    }

    #[test]
    fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(InMemoryLocationStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .insert(driver("d-1", f64::from(i), 0.0))
                        .unwrap()
                        .is_some()
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|inserted| *inserted)
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(store.count(LocationKind::Driver), 1);
    }

    #[test]
    fn kinds_are_separate_collections() {
        let store = InMemoryLocationStore::new();
        store.upsert(driver("shared-id", 1.0, 1.0)).unwrap();

        assert!(store.get(LocationKind::Restaurant, "shared-id").unwrap().is_none());
        assert!(store.delete(LocationKind::Driver, "shared-id").unwrap());
        assert!(!store.delete(LocationKind::Driver, "shared-id").unwrap());
    }

    #[test]
    fn near_filters_by_distance_and_sorts_nearest_first() {
        let store = InMemoryLocationStore::new();
        store.upsert(driver("far", 52.60, 13.40)).unwrap();
        store.upsert(driver("near", 52.521, 13.40)).unwrap();
        store.upsert(driver("mid", 52.55, 13.40)).unwrap();
        store.upsert(driver("out", 53.50, 13.40)).unwrap();

        let center = GeoPoint::new(52.52, 13.40);
        let found = store.near(LocationKind::Driver, &center, 10_000.0).unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.owner_id.as_str()).collect();

        assert_eq!(ids, vec!["near", "mid", "far"]);
    }

    #[test]
    fn zones_keep_insertion_order() {
        let store = InMemoryZoneStore::new();
        let first = zone("r-1", "first");
        let second = zone("r-1", "second");
        store.insert(first.clone()).unwrap();
        store.insert(second.clone()).unwrap();
        store.insert(zone("r-2", "other")).unwrap();

        let names: Vec<String> = store
            .zones_for("r-1")
            .unwrap()
            .into_iter()
            .map(|z| z.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn update_keeps_position_and_delete_removes() {
        let store = InMemoryZoneStore::new();
        let mut first = zone("r-1", "first");
        store.insert(first.clone()).unwrap();
        store.insert(zone("r-1", "second")).unwrap();

        first.name = "renamed".to_string();
        assert!(store.update(first.clone()).unwrap());
        assert_eq!(store.zones_for("r-1").unwrap()[0].name, "renamed");
        assert_eq!(store.get(first.id).unwrap().unwrap().name, "renamed");

        assert!(store.delete(first.id).unwrap());
        assert!(store.get(first.id).unwrap().is_none());
        assert_eq!(store.zones_for("r-1").unwrap().len(), 1);
        assert!(!store.update(first).unwrap());
    }

    #[test]
    fn moving_zone_to_other_restaurant() {
        let store = InMemoryZoneStore::new();
        let mut moved = zone("r-1", "moving");
        store.insert(moved.clone()).unwrap();

        moved.restaurant_id = "r-2".to_string();
        assert!(store.update(moved.clone()).unwrap());

        assert!(store.zones_for("r-1").unwrap().is_empty());
        assert_eq!(store.zones_for("r-2").unwrap()[0].id, moved.id);
    }
}
