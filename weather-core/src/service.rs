//! Orchestration: network check, geocode, forecast, report, with a single
//! fallback path for network-class failures.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::WeatherError,
    http::{Fetcher, HttpTransport, ReqwestTransport, send_with_deadline},
    model::{CurrentWeather, Location, WeatherReport},
    observer::{Event, Observer, Stage},
    probe::{HostResolver, NetworkProbe, SystemResolver},
    provider::{
        ProviderId, WeatherProvider, open_meteo::OpenMeteoClient, weatherapi::WeatherApiProvider,
    },
};

#[derive(Debug)]
enum State {
    CheckNetwork,
    Geocode,
    Forecast(Location),
    Report(Location, CurrentWeather),
    Fallback(WeatherError),
    Done(Option<WeatherReport>),
}

/// Entry point for current-weather lookups.
pub struct WeatherService {
    probe: NetworkProbe,
    primary: OpenMeteoClient,
    fallback: Arc<dyn WeatherProvider>,
    fallback_enabled: bool,
    transport: Arc<dyn HttpTransport>,
    connectivity_timeout: Duration,
    observer: Arc<dyn Observer>,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("probe", &self.probe)
            .field("primary", &self.primary)
            .field("fallback", &self.fallback)
            .field("fallback_enabled", &self.fallback_enabled)
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    /// Service talking to the real network through reqwest and the system resolver.
    pub fn new(config: &Config, observer: Arc<dyn Observer>) -> Self {
        Self::with_parts(
            config,
            Arc::new(ReqwestTransport::new()),
            Arc::new(SystemResolver),
            observer,
        )
    }

    pub fn with_parts(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        resolver: Arc<dyn HostResolver>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        let fetcher = Fetcher::new(transport.clone(), config.retry);
        let fallback = WeatherApiProvider::new(
            config.weather_api_key.clone(),
            transport.clone(),
            config.endpoints.fallback.clone(),
            config.retry.timeout,
        );

        Self {
            probe: NetworkProbe::new(resolver, config.probe_hosts.clone()),
            primary: OpenMeteoClient::new(fetcher, &config.endpoints),
            fallback: Arc::new(fallback),
            fallback_enabled: config.fallback_enabled,
            transport,
            connectivity_timeout: config.connectivity_timeout,
            observer,
        }
    }

    /// Current weather for `city`, or `None` on any failure. Failures are
    /// reported to the observer and never returned.
    pub async fn get_weather(&self, city: &str) -> Option<WeatherReport> {
        let city = city.trim();
        let mut state = if city.is_empty() {
            self.after_failure(Stage::Geocode, WeatherError::CityNotFound(String::new()))
        } else {
            State::CheckNetwork
        };

        loop {
            debug!(?state, "Entering state");
            state = match state {
                State::CheckNetwork => {
                    self.emit(Event::CheckingNetwork);
                    match self.probe.diagnose().await {
                        Ok(()) => State::Geocode,
                        Err(err) => self.after_failure(Stage::Network, err),
                    }
                }
                State::Geocode => self.geocode(city).await,
                State::Forecast(location) => match self.primary.current_weather(&location).await {
                    Ok(weather) => State::Report(location, weather),
                    Err(err) => self.after_failure(Stage::Forecast, err),
                },
                State::Report(location, weather) => {
                    let report = WeatherReport::new(ProviderId::OpenMeteo, location, weather);
                    info!(city = %report.location.name, "Weather report ready");
                    self.emit(Event::Report(report.clone()));
                    State::Done(Some(report))
                }
                State::Fallback(reason) => self.run_fallback(city, reason).await,
                State::Done(result) => return result,
            };
        }
    }

    async fn geocode(&self, city: &str) -> State {
        self.emit(Event::Searching { city: city.to_string() });
        match self.primary.geocode(city).await {
            Ok(Some(location)) => {
                self.emit(Event::LocationFound {
                    name: location.name.clone(),
                    country: location.country.clone(),
                });
                State::Forecast(location)
            }
            Ok(None) => {
                self.after_failure(Stage::Geocode, WeatherError::CityNotFound(city.to_string()))
            }
            Err(err) => self.after_failure(Stage::Geocode, err),
        }
    }

    /// The only transition out of a failed primary state.
    fn after_failure(&self, stage: Stage, error: WeatherError) -> State {
        warn!(?stage, error = %error, "Primary lookup failed");
        self.emit(Event::failure(stage, &error));

        if error.triggers_fallback() && self.fallback_enabled {
            State::Fallback(error)
        } else {
            State::Done(None)
        }
    }

    async fn run_fallback(&self, city: &str, reason: WeatherError) -> State {
        info!(provider = %self.fallback.id(), reason = %reason, "Switching to fallback provider");
        self.emit(Event::FallbackStarted { reason: reason.to_string() });

        match self.fallback.get_weather(city).await {
            Ok(report) => {
                self.emit(Event::Report(report.clone()));
                State::Done(Some(report))
            }
            Err(err) => {
                warn!(error = %err, "Fallback provider failed");
                self.emit(Event::failure(Stage::Fallback, &err));
                State::Done(None)
            }
        }
    }

    /// DNS diagnostic plus one geocoding request that is aborted after the
    /// connectivity timeout. Never retries.
    pub async fn test_connectivity(&self) -> ConnectivityReport {
        let dns = self.probe.diagnose().await.map_err(|err| err.to_string());

        let url = self.primary.geocoding_url();
        let query = [("name", "London".to_string()), ("count", "1".to_string())];
        let started = Instant::now();
        let deadline = self.connectivity_timeout;
        let api = match send_with_deadline(self.transport.as_ref(), url, &query, deadline).await {
            Ok(response) if response.is_success() => Ok(started.elapsed()),
            Ok(response) => Err(format!("unexpected status {}", response.status)),
            Err(err) => Err(err.to_string()),
        };

        ConnectivityReport {
            hosts: self.probe.hosts().to_vec(),
            dns,
            api,
            fallback_configured: self.fallback_enabled && self.fallback.is_configured(),
        }
    }

    fn emit(&self, event: Event) {
        self.observer.notify(&event);
    }
}

/// Outcome of [`WeatherService::test_connectivity`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityReport {
    pub hosts: Vec<String>,
    pub dns: Result<(), String>,
    pub api: Result<Duration, String>,
    pub fallback_configured: bool,
}

impl ConnectivityReport {
    pub fn is_ok(&self) -> bool {
        self.dns.is_ok() && self.api.is_ok()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        match &self.dns {
            Ok(()) => lines.push(format!("DNS:          ok ({})", self.hosts.join(", "))),
            Err(reason) => lines.push(format!("DNS:          FAILED ({reason})")),
        }
        match &self.api {
            Ok(latency) => lines.push(format!("Weather API:  ok ({} ms)", latency.as_millis())),
            Err(reason) => lines.push(format!("Weather API:  FAILED ({reason})")),
        }
        lines.push(format!(
            "Fallback:     {}",
            if self.fallback_configured { "configured" } else { "not configured" }
        ));

        lines
    }
}
