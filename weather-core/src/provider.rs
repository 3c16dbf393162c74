use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{error::WeatherError, model::WeatherReport};

pub mod open_meteo;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenMeteo,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "Open-Meteo",
            ProviderId::WeatherApi => "WeatherAPI.com",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider that answers "current weather for this city" in one call.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Whether the provider has what it needs (e.g. credentials) to make a call.
    fn is_configured(&self) -> bool {
        true
    }

    async fn get_weather(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}
