pub mod polygon;

use crate::error::AppError;
use crate::models::point::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    // Rounding can push h slightly outside [0, 1] near identical or antipodal points.
    let haversine =
        (sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng).clamp(0.0, 1.0);
    let central_angle = 2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt());

    EARTH_RADIUS_KM * central_angle
}

pub fn validate_point(point: &GeoPoint) -> Result<(), AppError> {
    if !point.latitude.is_finite() || !(-90.0..=90.0).contains(&point.latitude) {
        return Err(AppError::InvalidInput(format!(
            "latitude {} must be within [-90, 90]",
            point.latitude
        )));
    }

    if !point.longitude.is_finite() || !(-180.0..=180.0).contains(&point.longitude) {
        return Err(AppError::InvalidInput(format!(
            "longitude {} must be within [-180, 180]",
            point.longitude
        )));
    }

    Ok(())
}
