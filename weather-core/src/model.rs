use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    /// Degrees clockwise from north (0-360).
    pub wind_direction_deg: f64,
    /// Human-readable condition, when the provider reports one.
    pub condition: Option<String>,
    /// Assigned when the response was received.
    pub fetched_at: DateTime<Utc>,
}

/// Result of a successful lookup, from either provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: ProviderId,
    pub location: Location,
    pub weather: CurrentWeather,
    pub timestamp: DateTime<Utc>,
}

impl WeatherReport {
    pub fn new(provider: ProviderId, location: Location, weather: CurrentWeather) -> Self {
        Self { provider, location, weather, timestamp: Utc::now() }
    }
}

/// 16-point compass label for a wind direction in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS[index]
}
