use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::point::GeoPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub distance_km: f64,
    pub estimated_minutes: f64,
    pub delivery_fee: f64,
    pub zone_id: Uuid,
    pub zone_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoute {
    pub route: Vec<GeoPoint>,
    pub total_distance_km: f64,
}
