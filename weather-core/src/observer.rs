//! User-facing progress events and their console rendering.

use crate::{
    error::WeatherError,
    model::{WeatherReport, compass_point},
};

/// Where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Network,
    Geocode,
    Forecast,
    Fallback,
}

impl Stage {
    fn label(&self) -> &'static str {
        match self {
            Stage::Network => "Network check failed",
            Stage::Geocode => "Location lookup failed",
            Stage::Forecast => "Weather lookup failed",
            Stage::Fallback => "Backup weather service failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CheckingNetwork,
    Searching { city: String },
    LocationFound { name: String, country: String },
    Report(WeatherReport),
    FallbackStarted { reason: String },
    Failure {
        stage: Stage,
        message: String,
        hints: &'static [&'static str],
    },
}

impl Event {
    pub fn failure(stage: Stage, error: &WeatherError) -> Self {
        Event::Failure { stage, message: error.to_string(), hints: error.hints() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Event::Failure { .. })
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Event::CheckingNetwork => vec!["Checking network connectivity...".to_string()],
            Event::Searching { city } => vec![format!("Searching for '{city}'...")],
            Event::LocationFound { name, country } => {
                vec![format!("Found {}", place(name, country))]
            }
            Event::Report(report) => render_report(report),
            Event::FallbackStarted { reason } => vec![format!(
                "Primary weather service unavailable ({reason}); trying backup service..."
            )],
            Event::Failure { stage, message, hints } => {
                let mut lines = vec![format!("{}: {message}", stage.label())];
                lines.extend(hints.iter().map(|hint| format!("  - {hint}")));
                lines
            }
        }
    }
}

/// Receives progress and failure events from [`crate::WeatherService`].
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event);
}

/// Shared visual style for reports from every provider.
pub fn render_report(report: &WeatherReport) -> Vec<String> {
    let location = &report.location;
    let weather = &report.weather;

    let mut lines = vec![
        format!(
            "Weather for {} ({:.2}, {:.2})",
            place(&location.name, &location.country),
            location.latitude,
            location.longitude
        ),
        format!("  Temperature: {}°C", weather.temperature_c),
        format!(
            "  Wind:        {} km/h from {}° ({})",
            weather.wind_speed_kmh,
            weather.wind_direction_deg,
            compass_point(weather.wind_direction_deg)
        ),
    ];

    if let Some(condition) = &weather.condition {
        lines.push(format!("  Conditions:  {condition}"));
    }

    lines.push(format!(
        "  Source:      {} at {}",
        report.provider.display_name(),
        weather.fetched_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    ));

    lines
}

fn place(name: &str, country: &str) -> String {
    if country.is_empty() {
        name.to_string()
    } else {
        format!("{name}, {country}")
    }
}
