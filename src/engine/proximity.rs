use std::sync::Arc;

use crate::error::AppError;
use crate::geo::{haversine_km, validate_point};
use crate::models::location::{LocationKind, LocationRecord, NearbyLocation};
use crate::models::point::GeoPoint;
use crate::store::LocationStore;

const METERS_PER_KM: f64 = 1_000.0;

#[derive(Clone)]
pub struct ProximityIndex {
    store: Arc<dyn LocationStore>,
    max_radius_km: f64,
}

impl ProximityIndex {
    pub fn new(store: Arc<dyn LocationStore>, max_radius_km: f64) -> Self {
        Self {
            store,
            max_radius_km,
        }
    }

    pub fn upsert(&self, record: LocationRecord) -> Result<LocationRecord, AppError> {
        validate_record(&record)?;
        Ok(self.store.upsert(record)?)
    }

    /// Stores a new record, failing with `Conflict` if the owner already has one.
    pub fn create(&self, record: LocationRecord) -> Result<LocationRecord, AppError> {
        validate_record(&record)?;

        let (kind, owner_id) = (record.kind, record.owner_id.clone());
        self.store.insert(record)?.ok_or_else(|| {
            AppError::Conflict(format!("{} location {owner_id} already exists", kind.as_str()))
        })
    }

    pub fn get(
        &self,
        kind: LocationKind,
        owner_id: &str,
    ) -> Result<Option<LocationRecord>, AppError> {
        Ok(self.store.get(kind, owner_id)?)
    }

    pub fn delete(&self, kind: LocationKind, owner_id: &str) -> Result<bool, AppError> {
        Ok(self.store.delete(kind, owner_id)?)
    }

    pub fn count(&self, kind: LocationKind) -> usize {
        self.store.count(kind)
    }

    pub fn find_within(
        &self,
        center: &GeoPoint,
        radius_km: f64,
        kind: LocationKind,
    ) -> Result<Vec<NearbyLocation>, AppError> {
        validate_point(center)?;
        if !radius_km.is_finite() || radius_km < 0.0 || radius_km > self.max_radius_km {
            return Err(AppError::InvalidRadius {
                radius_km,
                max_km: self.max_radius_km,
            });
        }

        let records = self.store.near(kind, center, radius_km * METERS_PER_KM)?;

        Ok(records
            .into_iter()
            .map(|record| NearbyLocation {
                distance_km: haversine_km(center, &record.location),
                record,
            })
            .filter(|nearby| nearby.distance_km <= radius_km)
            .collect())
    }
}

fn validate_record(record: &LocationRecord) -> Result<(), AppError> {
    validate_point(&record.location)?;
    if record.owner_id.trim().is_empty() {
        return Err(AppError::InvalidInput("owner id cannot be empty".to_string()));
    }
    Ok(())
}
