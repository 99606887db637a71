use std::sync::Arc;

use tracing::debug;

use crate::error::AppError;
use crate::geo::polygon::{close_ring, point_in_ring};
use crate::geo::validate_point;
use crate::models::point::GeoPoint;
use crate::models::zone::DeliveryZone;
use crate::store::ZoneStore;

#[derive(Clone)]
pub struct ZoneResolver {
    store: Arc<dyn ZoneStore>,
}

impl ZoneResolver {
    pub fn new(store: Arc<dyn ZoneStore>) -> Self {
        Self { store }
    }

    /// First containing zone in store order. `Ok(None)` means delivery is
    /// unavailable at that address.
    pub fn resolve(
        &self,
        destination: &GeoPoint,
        restaurant_id: &str,
    ) -> Result<Option<DeliveryZone>, AppError> {
        validate_point(destination)?;

        let zones = self.store.zones_for(restaurant_id)?;
        let zone = zones
            .into_iter()
            .find(|zone| point_in_ring(destination, &zone.boundary));

        debug!(
            restaurant_id,
            zone_id = ?zone.as_ref().map(|z| z.id),
            "zone resolved"
        );
        Ok(zone)
    }
}

pub fn validate_zone(mut zone: DeliveryZone) -> Result<DeliveryZone, AppError> {
    if zone.restaurant_id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "restaurant_id cannot be empty".to_string(),
        ));
    }
    if zone.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name cannot be empty".to_string()));
    }
    if !zone.delivery_fee.is_finite() || zone.delivery_fee < 0.0 {
        return Err(AppError::InvalidInput(
            "delivery_fee must be >= 0".to_string(),
        ));
    }
    if !zone.minimum_order.is_finite() || zone.minimum_order < 0.0 {
        return Err(AppError::InvalidInput(
            "minimum_order must be >= 0".to_string(),
        ));
    }

    zone.boundary = close_ring(zone.boundary)?;
    Ok(zone)
}
