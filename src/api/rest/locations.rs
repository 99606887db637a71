use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::api::rest::extract::ApiJson;
use crate::engine::estimate::travel_minutes;
use crate::error::AppError;
use crate::geo::{haversine_km, validate_point};
use crate::geocoding::{canonical_address, canonical_point, validate_address};
use crate::models::location::{Address, LocationKind, NearbyLocation};
use crate::models::point::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/locations/distance", post(calculate_distance))
        .route("/locations/nearby", post(find_nearby))
        .route("/locations/validate", post(validate))
        .route("/locations/geocode", post(geocode))
        .route("/locations/reverse-geocode", post(reverse_geocode))
}

#[derive(Deserialize)]
pub struct DistanceRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

#[derive(Serialize)]
pub struct DistanceResponse {
    pub distance_km: f64,
    pub duration_minutes: f64,
}

#[derive(Deserialize)]
pub struct NearbyRequest {
    pub location: GeoPoint,
    pub radius_km: Option<f64>,
    #[serde(rename = "type")]
    pub kind: LocationKind,
}

#[derive(Deserialize)]
pub struct GeocodeRequest {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub location: GeoPoint,
    pub address: Address,
}

async fn calculate_distance(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<DistanceRequest>,
) -> Result<Json<DistanceResponse>, AppError> {
    validate_point(&payload.origin)?;
    validate_point(&payload.destination)?;

    let distance_km = haversine_km(&payload.origin, &payload.destination);
    let duration_minutes =
        travel_minutes(distance_km, state.config.location.default_delivery_speed_kmh);

    Ok(Json(DistanceResponse {
        distance_km,
        duration_minutes,
    }))
}

async fn find_nearby(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NearbyRequest>,
) -> Result<Json<Vec<NearbyLocation>>, AppError> {
    let radius_km = payload
        .radius_km
        .unwrap_or(state.config.location.default_search_radius_km);

    let found = state
        .locations
        .find_within(&payload.location, radius_km, payload.kind)?;

    state
        .metrics
        .nearby_queries_total
        .with_label_values(&[payload.kind.as_str()])
        .inc();

    Ok(Json(found))
}

async fn validate(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<GeocodeRequest>,
) -> Result<Json<Address>, AppError> {
    validate_address(&payload.address)?;

    let key = format!("address:{}", canonical_address(&payload.address));
    let validated: Address = state.cache.get_or_compute(&key, state.cache.ttl(), || {
        Ok(state.geocoder.validate_address(&payload.address)?)
    })?;

    Ok(Json(validated))
}

async fn geocode(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<GeocodeRequest>,
) -> Result<Json<GeocodeResponse>, AppError> {
    validate_address(&payload.address)?;

    let key = format!("geocode:{}", canonical_address(&payload.address));
    let response: GeocodeResponse = state.cache.get_or_compute(&key, state.cache.ttl(), || {
        let location = state.geocoder.geocode(&payload.address)?;
        Ok(GeocodeResponse {
            location,
            address: payload.address.clone(),
        })
    })?;

    Ok(Json(response))
}

async fn reverse_geocode(
    State(state): State<Arc<AppState>>,
    ApiJson(point): ApiJson<GeoPoint>,
) -> Result<Json<GeocodeResponse>, AppError> {
    validate_point(&point)?;

    let key = format!("reverse_geocode:{}", canonical_point(&point));
    let response: GeocodeResponse = state.cache.get_or_compute(&key, state.cache.ttl(), || {
        let address = state.geocoder.reverse_geocode(&point)?;
        Ok(GeocodeResponse {
            location: point,
            address,
        })
    })?;

    Ok(Json(response))
}
