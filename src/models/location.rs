use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::point::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Restaurant,
    Driver,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Restaurant => "restaurant",
            LocationKind::Driver => "driver",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Available,
    Busy,
    Offline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub owner_id: String,
    pub kind: LocationKind,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DriverStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl LocationRecord {
    pub fn new(kind: LocationKind, owner_id: impl Into<String>, location: GeoPoint) -> Self {
        let now = Utc::now();
        Self {
            owner_id: owner_id.into(),
            kind,
            location,
            status: None,
            address: None,
            created_at: now,
            last_updated: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyLocation {
    #[serde(flatten)]
    pub record: LocationRecord,
    pub distance_km: f64,
}
