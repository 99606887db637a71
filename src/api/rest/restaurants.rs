use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::engine::zones::validate_zone;
use crate::error::AppError;
use crate::models::location::{Address, LocationKind, LocationRecord};
use crate::models::point::GeoPoint;
use crate::models::zone::DeliveryZone;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/restaurants/locations", post(create_restaurant_location))
        .route(
            "/restaurants/locations/:id",
            get(get_restaurant_location)
                .put(update_restaurant_location)
                .delete(delete_restaurant_location),
        )
        .route("/restaurants/locations/:id/zones", get(list_zones))
        .route("/restaurants/zones", post(create_zone))
        .route(
            "/restaurants/zones/:zone_id",
            put(update_zone).delete(delete_zone),
        )
}

#[derive(Deserialize)]
pub struct CreateRestaurantLocationRequest {
    pub restaurant_id: String,
    pub location: GeoPoint,
    pub address: Option<Address>,
}

#[derive(Deserialize)]
pub struct UpdateRestaurantLocationRequest {
    pub location: GeoPoint,
    pub address: Option<Address>,
}

#[derive(Deserialize)]
pub struct ZoneRequest {
    pub restaurant_id: String,
    pub name: String,
    pub boundary: Vec<GeoPoint>,
    pub delivery_fee: f64,
    pub minimum_order: f64,
    pub base_estimated_minutes: u32,
}

async fn create_restaurant_location(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateRestaurantLocationRequest>,
) -> Result<(StatusCode, Json<LocationRecord>), AppError> {
    if payload.restaurant_id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "restaurant_id cannot be empty".to_string(),
        ));
    }

    let mut record = LocationRecord::new(
        LocationKind::Restaurant,
        payload.restaurant_id,
        payload.location,
    );
    record.address = payload.address;

    let stored = state.locations.create(record)?;
    info!(restaurant_id = %stored.owner_id, "restaurant location created");

    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_restaurant_location(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<LocationRecord>, AppError> {
    let record = state
        .locations
        .get(LocationKind::Restaurant, &id)?
        .ok_or_else(|| AppError::NotFound(format!("restaurant location {id} not found")))?;

    Ok(Json(record))
}

async fn update_restaurant_location(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<UpdateRestaurantLocationRequest>,
) -> Result<Json<LocationRecord>, AppError> {
    let mut record = state
        .locations
        .get(LocationKind::Restaurant, &id)?
        .ok_or_else(|| AppError::NotFound(format!("restaurant location {id} not found")))?;

    record.location = payload.location;
    record.address = payload.address.or(record.address);
    record.last_updated = Utc::now();

    let stored = state.locations.upsert(record)?;
    info!(restaurant_id = %id, "restaurant location updated");

    Ok(Json(stored))
}

async fn delete_restaurant_location(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Value>, AppError> {
    if !state.locations.delete(LocationKind::Restaurant, &id)? {
        return Err(AppError::NotFound(format!(
            "restaurant location {id} not found"
        )));
    }

    info!(restaurant_id = %id, "restaurant location deleted");
    Ok(Json(json!({ "message": "restaurant location deleted" })))
}

async fn list_zones(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Vec<DeliveryZone>>, AppError> {
    Ok(Json(state.zone_store.zones_for(&id)?))
}

async fn create_zone(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ZoneRequest>,
) -> Result<(StatusCode, Json<DeliveryZone>), AppError> {
    let now = Utc::now();
    let zone = validate_zone(DeliveryZone {
        id: Uuid::new_v4(),
        restaurant_id: payload.restaurant_id,
        name: payload.name,
        boundary: payload.boundary,
        delivery_fee: payload.delivery_fee,
        minimum_order: payload.minimum_order,
        base_estimated_minutes: payload.base_estimated_minutes,
        created_at: now,
        updated_at: now,
    })?;

    state.zone_store.insert(zone.clone())?;
    info!(zone_id = %zone.id, restaurant_id = %zone.restaurant_id, "delivery zone created");

    Ok((StatusCode::CREATED, Json(zone)))
}

async fn update_zone(
    State(state): State<Arc<AppState>>,
    ApiPath(zone_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ZoneRequest>,
) -> Result<Json<DeliveryZone>, AppError> {
    let existing = state
        .zone_store
        .get(zone_id)?
        .ok_or_else(|| AppError::NotFound(format!("delivery zone {zone_id} not found")))?;

    let zone = validate_zone(DeliveryZone {
        id: zone_id,
        restaurant_id: payload.restaurant_id,
        name: payload.name,
        boundary: payload.boundary,
        delivery_fee: payload.delivery_fee,
        minimum_order: payload.minimum_order,
        base_estimated_minutes: payload.base_estimated_minutes,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    })?;

    if !state.zone_store.update(zone.clone())? {
        return Err(AppError::NotFound(format!(
            "delivery zone {zone_id} not found"
        )));
    }

    info!(zone_id = %zone_id, "delivery zone updated");
    Ok(Json(zone))
}

async fn delete_zone(
    State(state): State<Arc<AppState>>,
    ApiPath(zone_id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.zone_store.delete(zone_id)? {
        return Err(AppError::NotFound(format!(
            "delivery zone {zone_id} not found"
        )));
    }

    info!(zone_id = %zone_id, "delivery zone deleted");
    Ok(Json(json!({ "message": "delivery zone deleted" })))
}
