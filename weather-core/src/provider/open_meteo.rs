use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Endpoints,
    error::WeatherError,
    http::Fetcher,
    model::{CurrentWeather, Location},
};

/// Primary provider: Open-Meteo geocoding plus forecast, no key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    fetcher: Fetcher,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(fetcher: Fetcher, endpoints: &Endpoints) -> Self {
        Self {
            fetcher,
            geocoding_url: endpoints.geocoding.clone(),
            forecast_url: endpoints.forecast.clone(),
        }
    }

    pub fn geocoding_url(&self) -> &str {
        &self.geocoding_url
    }

    /// Best match for `city`, or `None` when the search has no results.
    pub async fn geocode(&self, city: &str) -> Result<Option<Location>, WeatherError> {
        let query = [
            ("name", city.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let parsed: OmGeocodingResponse =
            self.fetcher.fetch_json(&self.geocoding_url, &query).await?;

        let location = parsed.results.into_iter().next().map(|r| Location {
            name: r.name,
            country: r.country.unwrap_or_default(),
            latitude: r.latitude,
            longitude: r.longitude,
        });

        debug!(%city, found = location.is_some(), "Geocoding finished");
        Ok(location)
    }

    pub async fn current_weather(&self, location: &Location) -> Result<CurrentWeather, WeatherError> {
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current_weather", "true".to_string()),
        ];

        let parsed: OmForecastResponse = self.fetcher.fetch_json(&self.forecast_url, &query).await?;
        let current = parsed
            .current_weather
            .ok_or(WeatherError::MissingField("current_weather"))?;

        Ok(CurrentWeather {
            temperature_c: current.temperature,
            wind_speed_kmh: current.windspeed,
            wind_direction_deg: current.winddirection,
            condition: current.weathercode.and_then(describe_weather_code).map(str::to_string),
            fetched_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    // Omitted entirely when nothing matches.
    #[serde(default)]
    results: Vec<OmGeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: Option<OmCurrentWeather>,
}

/// WMO weather interpretation code as used by Open-Meteo.
fn describe_weather_code(code: u8) -> Option<&'static str> {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snowfall",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RetryPolicy, testing::ScriptedTransport};
    use std::{sync::Arc, time::Duration};

    fn client(transport: Arc<ScriptedTransport>) -> OpenMeteoClient {
        let fetcher = Fetcher::new(transport, RetryPolicy::immediate(3, Duration::from_secs(5)));
        OpenMeteoClient::new(fetcher, &Endpoints::default())
    }

    #[tokio::test]
    async fn geocode_takes_first_result_and_sends_expected_query() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(
            &endpoints.geocoding,
            200,
            r#"{"results":[{"id":1273294,"name":"Delhi","latitude":28.65195,"longitude":77.23149,"country":"India"}],"generationtime_ms":0.5}"#,
        );

        let location = client(transport.clone()).geocode("Delhi").await.unwrap().unwrap();

        assert_eq!(location.name, "Delhi");
        assert_eq!(location.country, "India");
        assert_eq!(location.latitude, 28.65195);

        let query = transport.last_query(&endpoints.geocoding).unwrap();
        assert!(query.contains(&("name".to_string(), "Delhi".to_string())));
        assert!(query.contains(&("count".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn geocode_without_results_is_none() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(&endpoints.geocoding, 200, r#"{"generationtime_ms":0.3}"#);
        transport.push_ok(&endpoints.geocoding, 200, r#"{"results":[]}"#);

        let client = client(transport);
        assert!(client.geocode("Zzzznotacity").await.unwrap().is_none());
        assert!(client.geocode("Zzzznotacity").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn current_weather_maps_fields() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(
            &endpoints.forecast,
            200,
            r#"{"latitude":28.6,"longitude":77.2,"current_weather":{"time":"2024-05-01T12:00","temperature":25,"windspeed":10,"winddirection":180,"weathercode":2}}"#,
        );

        let location = Location {
            name: "Delhi".into(),
            country: "India".into(),
            latitude: 28.6,
            longitude: 77.2,
        };
        let weather = client(transport.clone()).current_weather(&location).await.unwrap();

        assert_eq!(weather.temperature_c, 25.0);
        assert_eq!(weather.wind_speed_kmh, 10.0);
        assert_eq!(weather.wind_direction_deg, 180.0);
        assert_eq!(weather.condition.as_deref(), Some("Partly cloudy"));

        let query = transport.last_query(&endpoints.forecast).unwrap();
        assert!(query.contains(&("current_weather".to_string(), "true".to_string())));
        assert!(query.contains(&("latitude".to_string(), "28.6".to_string())));
    }

    #[tokio::test]
    async fn current_weather_missing_field() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(&endpoints.forecast, 200, r#"{"latitude":28.6,"longitude":77.2}"#);

        let location = Location {
            name: "Delhi".into(),
            country: "India".into(),
            latitude: 28.6,
            longitude: 77.2,
        };
        let err = client(transport).current_weather(&location).await.unwrap_err();

        assert!(matches!(err, WeatherError::MissingField("current_weather")));
    }

    #[test]
    fn unknown_weather_codes_have_no_description() {
        assert_eq!(describe_weather_code(0), Some("Clear sky"));
        assert_eq!(describe_weather_code(81), Some("Rain showers"));
        assert_eq!(describe_weather_code(42), None);
    }
}
