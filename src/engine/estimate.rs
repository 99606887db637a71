use tracing::info;

use crate::engine::zones::ZoneResolver;
use crate::error::AppError;
use crate::geo::{haversine_km, validate_point};
use crate::models::delivery::DeliveryEstimate;
use crate::models::point::GeoPoint;

const MINUTES_PER_HOUR: f64 = 60.0;

pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / speed_kmh * MINUTES_PER_HOUR
}

pub fn validate_speed(speed_kmh: f64) -> Result<(), AppError> {
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "average speed {speed_kmh} km/h must be > 0"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DeliveryEstimator {
    zones: ZoneResolver,
}

impl DeliveryEstimator {
    pub fn new(zones: ZoneResolver) -> Self {
        Self { zones }
    }

    /// A raw travel time below the zone's base minutes is raised to the base.
    pub fn estimate(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        restaurant_id: &str,
        avg_speed_kmh: f64,
    ) -> Result<DeliveryEstimate, AppError> {
        validate_point(origin)?;
        validate_point(destination)?;
        validate_speed(avg_speed_kmh)?;

        let distance_km = haversine_km(origin, destination);

        let zone = self
            .zones
            .resolve(destination, restaurant_id)?
            .ok_or(AppError::DeliveryUnavailable)?;

        let raw_minutes = travel_minutes(distance_km, avg_speed_kmh);
        let base_minutes = f64::from(zone.base_estimated_minutes);
        let estimated_minutes = if raw_minutes < base_minutes {
            base_minutes
        } else {
            raw_minutes
        };

        info!(
            restaurant_id,
            zone_id = %zone.id,
            distance_km,
            estimated_minutes,
            "delivery estimated"
        );

        Ok(DeliveryEstimate {
            distance_km,
            estimated_minutes,
            delivery_fee: zone.delivery_fee,
            zone_id: zone.id,
            zone_name: zone.name,
        })
    }
}
