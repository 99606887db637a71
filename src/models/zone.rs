use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::point::GeoPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: Uuid,
    pub restaurant_id: String,
    pub name: String,
    /// Closed ring: the last vertex repeats the first.
    pub boundary: Vec<GeoPoint>,
    pub delivery_fee: f64,
    pub minimum_order: f64,
    pub base_estimated_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
