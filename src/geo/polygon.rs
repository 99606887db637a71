use crate::error::AppError;
use crate::geo::validate_point;
use crate::models::point::GeoPoint;

const MIN_DISTINCT_VERTICES: usize = 3;

/// Even-odd ray casting with longitude as x and latitude as y.
pub fn point_in_ring(point: &GeoPoint, ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < MIN_DISTINCT_VERTICES {
        return false;
    }

    let (lat, lng) = (point.latitude, point.longitude);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (yi, xi) = (ring[i].latitude, ring[i].longitude);
        let (yj, xj) = (ring[j].latitude, ring[j].longitude);

        if ((yi > lat) != (yj > lat)) && (lng < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

pub fn close_ring(mut points: Vec<GeoPoint>) -> Result<Vec<GeoPoint>, AppError> {
    for point in &points {
        validate_point(point)?;
    }

    let mut distinct: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for point in &points {
        if !distinct.contains(point) {
            distinct.push(*point);
        }
    }

    if distinct.len() < MIN_DISTINCT_VERTICES {
        return Err(AppError::InvalidInput(format!(
            "zone boundary needs at least {MIN_DISTINCT_VERTICES} distinct vertices, got {}",
            distinct.len()
        )));
    }

    if points.first() != points.last() {
        points.push(points[0]);
    }

    Ok(points)
}
