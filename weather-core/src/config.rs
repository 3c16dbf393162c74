use std::time::Duration;

/// Name of the environment variable holding the fallback provider's API key.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Bounds and delays for fetch-with-retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Per-attempt deadline.
    pub timeout: Duration,
    /// Step of the linear backoff applied after connection errors.
    pub backoff_step: Duration,
    /// Flat delay applied after a request-level timeout.
    pub timeout_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(10),
            backoff_step: Duration::from_secs(1),
            timeout_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt after a connection error, given the
    /// retries still available before that attempt is consumed.
    pub fn backoff(&self, retries_left: u32) -> Duration {
        let attempt = (self.max_retries + 1).saturating_sub(retries_left);
        self.backoff_step * attempt
    }

    /// Policy with zero delays, used where waiting would only slow things down.
    pub fn immediate(max_retries: u32, timeout: Duration) -> Self {
        Self {
            max_retries,
            timeout,
            backoff_step: Duration::ZERO,
            timeout_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub geocoding: String,
    pub forecast: String,
    pub fallback: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
            fallback: "https://api.weatherapi.com/v1/current.json".to_string(),
        }
    }
}

/// Runtime configuration for [`crate::WeatherService`].
#[derive(Debug, Clone)]
pub struct Config {
    pub retry: RetryPolicy,
    pub endpoints: Endpoints,
    /// Hostnames that must all resolve for the network to count as available.
    pub probe_hosts: Vec<String>,
    pub fallback_enabled: bool,
    pub weather_api_key: Option<String>,
    /// Hard deadline for the single request made by the connectivity test.
    pub connectivity_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            endpoints: Endpoints::default(),
            probe_hosts: vec!["api.open-meteo.com".to_string(), "google.com".to_string()],
            fallback_enabled: true,
            weather_api_key: None,
            connectivity_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Default configuration with the API key taken from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Default configuration with the API key taken from `lookup`.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let weather_api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Self { weather_api_key, ..Self::default() }
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.weather_api_key.is_some()
    }
}
