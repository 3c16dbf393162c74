use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::{
    error::WeatherError,
    http::{HttpTransport, parse_json, send_with_deadline},
    model::{CurrentWeather, Location, WeatherReport},
};

use super::{ProviderId, WeatherProvider};

/// Fallback provider backed by WeatherAPI.com. Requires an API key.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: Option<String>,
    transport: Arc<dyn HttpTransport>,
    url: String,
    timeout: Duration,
}

impl WeatherApiProvider {
    pub fn new(
        api_key: Option<String>,
        transport: Arc<dyn HttpTransport>,
        url: String,
        timeout: Duration,
    ) -> Self {
        Self { api_key, transport, url, timeout }
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    wind_kph: f64,
    wind_degree: f64,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Single attempt, no retry.
    async fn get_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingCredential)?;

        info!(%city, "Requesting current weather from WeatherAPI.com");
        let query = [("key", api_key.to_string()), ("q", city.to_string())];
        let response =
            send_with_deadline(self.transport.as_ref(), &self.url, &query, self.timeout).await?;
        let parsed: WaResponse = parse_json(&self.url, response)?;

        let location = Location {
            name: parsed.location.name,
            country: parsed.location.country,
            latitude: parsed.location.lat,
            longitude: parsed.location.lon,
        };

        let weather = CurrentWeather {
            temperature_c: parsed.current.temp_c,
            wind_speed_kmh: parsed.current.wind_kph,
            wind_direction_deg: parsed.current.wind_degree,
            condition: parsed.current.condition.map(|c| c.text),
            fetched_at: Utc::now(),
        };

        Ok(WeatherReport::new(self.id(), location, weather))
    }
}
