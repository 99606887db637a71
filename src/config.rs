use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct LocationSettings {
    pub default_search_radius_km: f64,
    pub max_search_radius_km: f64,
    pub default_delivery_speed_kmh: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            default_search_radius_km: 5.0,
            max_search_radius_km: 50.0,
            default_delivery_speed_kmh: 30.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_entries: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub location: LocationSettings,
    pub cache: CacheSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3014,
            log_level: "info".to_string(),
            event_buffer_size: 1024,
            location: LocationSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Config::default();

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            location: LocationSettings {
                default_search_radius_km: parse_or_default(
                    "DEFAULT_SEARCH_RADIUS_KM",
                    defaults.location.default_search_radius_km,
                )?,
                max_search_radius_km: parse_or_default(
                    "MAX_SEARCH_RADIUS_KM",
                    defaults.location.max_search_radius_km,
                )?,
                default_delivery_speed_kmh: parse_or_default(
                    "DEFAULT_DELIVERY_SPEED_KMH",
                    defaults.location.default_delivery_speed_kmh,
                )?,
            },
            cache: CacheSettings {
                ttl: Duration::from_secs(parse_or_default(
                    "CACHE_TTL_SECS",
                    defaults.cache.ttl.as_secs(),
                )?),
                max_entries: parse_or_default("CACHE_MAX_ENTRIES", defaults.cache.max_entries)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let location = &self.location;

        if !location.max_search_radius_km.is_finite() || location.max_search_radius_km <= 0.0 {
            return Err(AppError::Internal(
                "MAX_SEARCH_RADIUS_KM must be > 0".to_string(),
            ));
        }
        if !(0.0..=location.max_search_radius_km).contains(&location.default_search_radius_km) {
            return Err(AppError::Internal(format!(
                "DEFAULT_SEARCH_RADIUS_KM must be within [0, {}]",
                location.max_search_radius_km
            )));
        }
        if !location.default_delivery_speed_kmh.is_finite()
            || location.default_delivery_speed_kmh <= 0.0
        {
            return Err(AppError::Internal(
                "DEFAULT_DELIVERY_SPEED_KMH must be > 0".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::Internal(
                "CACHE_MAX_ENTRIES must be > 0".to_string(),
            ));
        }
        if self.event_buffer_size == 0 {
            return Err(AppError::Internal(
                "EVENT_BUFFER_SIZE must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
