use std::sync::Arc;

use axum::extract::State;
use axum::routing::{post, put};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::engine::estimate::travel_minutes;
use crate::engine::route::optimize_route;
use crate::error::AppError;
use crate::geo::validate_point;
use crate::models::delivery::DeliveryEstimate;
use crate::models::location::{DriverStatus, LocationKind, LocationRecord};
use crate::models::point::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/delivery/estimate", post(estimate_delivery))
        .route("/delivery/optimize", post(optimize_delivery_route))
        .route(
            "/delivery/drivers/:id/location",
            put(update_driver_location).get(get_driver_location),
        )
}

#[derive(Deserialize)]
pub struct EstimateRequest {
    pub origin: Option<GeoPoint>,
    pub destination: GeoPoint,
    pub restaurant_id: String,
    pub average_speed_kmh: Option<f64>,
}

#[derive(Deserialize)]
pub struct OptimizeRequest {
    pub driver_id: String,
    pub delivery_locations: Vec<GeoPoint>,
}

#[derive(Serialize)]
pub struct OptimizeResponse {
    pub optimized_route: Vec<GeoPoint>,
    pub total_distance_km: f64,
    pub estimated_minutes: f64,
}

#[derive(Deserialize)]
pub struct UpdateDriverLocationRequest {
    pub location: GeoPoint,
    pub status: DriverStatus,
}

async fn estimate_delivery(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<EstimateRequest>,
) -> Result<Json<DeliveryEstimate>, AppError> {
    let origin = match payload.origin {
        Some(origin) => origin,
        None => {
            state
                .locations
                .get(LocationKind::Restaurant, &payload.restaurant_id)?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "restaurant location {} not found",
                        payload.restaurant_id
                    ))
                })?
                .location
        }
    };
    let speed_kmh = payload
        .average_speed_kmh
        .unwrap_or(state.config.location.default_delivery_speed_kmh);

    let result = state.estimator.estimate(
        &origin,
        &payload.destination,
        &payload.restaurant_id,
        speed_kmh,
    );

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::DeliveryUnavailable) => "unavailable",
        Err(_) => "error",
    };
    state
        .metrics
        .delivery_estimates_total
        .with_label_values(&[outcome])
        .inc();

    Ok(Json(result?))
}

async fn optimize_delivery_route(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    if payload.delivery_locations.is_empty() {
        return Err(AppError::InvalidInput(
            "at least one delivery location is required".to_string(),
        ));
    }
    for stop in &payload.delivery_locations {
        validate_point(stop)?;
    }

    let driver = state
        .locations
        .get(LocationKind::Driver, &payload.driver_id)?
        .ok_or_else(|| {
            AppError::NotFound(format!("driver {} location not found", payload.driver_id))
        })?;

    let planned = optimize_route(driver.location, &payload.delivery_locations);
    let estimated_minutes = travel_minutes(
        planned.total_distance_km,
        state.config.location.default_delivery_speed_kmh,
    );

    state
        .metrics
        .route_stops
        .observe(payload.delivery_locations.len() as f64);
    info!(
        driver_id = %payload.driver_id,
        stops = payload.delivery_locations.len(),
        total_distance_km = planned.total_distance_km,
        "route optimized"
    );

    Ok(Json(OptimizeResponse {
        optimized_route: planned.route,
        total_distance_km: planned.total_distance_km,
        estimated_minutes,
    }))
}

async fn update_driver_location(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<UpdateDriverLocationRequest>,
) -> Result<Json<LocationRecord>, AppError> {
    let mut record = LocationRecord::new(LocationKind::Driver, id, payload.location);
    record.status = Some(payload.status);

    let stored = state.locations.upsert(record)?;
    let _ = state.driver_events_tx.send(stored.clone());

    info!(driver_id = %stored.owner_id, status = ?stored.status, "driver location updated");
    Ok(Json(stored))
}

async fn get_driver_location(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<LocationRecord>, AppError> {
    let record = state
        .locations
        .get(LocationKind::Driver, &id)?
        .ok_or_else(|| AppError::NotFound(format!("driver {id} location not found")))?;

    Ok(Json(record))
}
