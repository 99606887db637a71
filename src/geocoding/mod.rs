use thiserror::Error;

use crate::error::AppError;
use crate::models::location::Address;
use crate::models::point::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding provider unavailable: {0}")]
    Unavailable(String),
}

pub trait GeocodingProvider: Send + Sync {
    fn validate_address(&self, address: &Address) -> Result<Address, GeocodeError>;

    fn geocode(&self, address: &Address) -> Result<GeoPoint, GeocodeError>;

    fn reverse_geocode(&self, point: &GeoPoint) -> Result<Address, GeocodeError>;
}

const MOCK_LOCATION: GeoPoint = GeoPoint::new(37.7749, -122.4194);

#[derive(Debug, Default, Clone)]
pub struct MockGeocoder;

impl GeocodingProvider for MockGeocoder {
    fn validate_address(&self, address: &Address) -> Result<Address, GeocodeError> {
        Ok(Address {
            formatted_address: Some(format!(
                "{}, {}, {} {}, {}",
                address.street, address.city, address.state, address.postal_code, address.country
            )),
            ..address.clone()
        })
    }

    fn geocode(&self, _address: &Address) -> Result<GeoPoint, GeocodeError> {
        Ok(MOCK_LOCATION)
    }

    fn reverse_geocode(&self, _point: &GeoPoint) -> Result<Address, GeocodeError> {
        Ok(Address {
            street: "123 Main St".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            country: "USA".to_string(),
            postal_code: "94105".to_string(),
            formatted_address: Some("123 Main St, San Francisco, CA 94105, USA".to_string()),
        })
    }
}

pub fn validate_address(address: &Address) -> Result<(), AppError> {
    let required = [
        ("street", &address.street),
        ("city", &address.city),
        ("state", &address.state),
        ("country", &address.country),
        ("postal_code", &address.postal_code),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::InvalidInput(format!("{field} cannot be empty")));
        }
    }

    Ok(())
}

pub fn canonical_address(address: &Address) -> String {
    let raw = match address.formatted_address.as_deref() {
        Some(formatted) if !formatted.trim().is_empty() => formatted.to_string(),
        _ => [
            address.street.as_str(),
            address.city.as_str(),
            address.state.as_str(),
            address.postal_code.as_str(),
            address.country.as_str(),
        ]
        .join(","),
    };

    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn canonical_point(point: &GeoPoint) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}
