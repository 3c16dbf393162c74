//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration (retry policy, endpoints, fallback credential)
//! - HTTP fetch-with-retry and a DNS network diagnostic
//! - The Open-Meteo primary provider and the WeatherAPI.com fallback
//! - [`WeatherService`], which ties them together and never fails loudly
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod observer;
pub mod probe;
pub mod provider;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, Endpoints, RetryPolicy};
pub use error::{ConnectionKind, WeatherError};
pub use model::{CurrentWeather, Location, WeatherReport};
pub use observer::{Event, Observer, Stage, render_report};
pub use provider::{ProviderId, WeatherProvider};
pub use service::{ConnectivityReport, WeatherService};
