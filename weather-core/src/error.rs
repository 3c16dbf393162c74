use std::{fmt, io, time::Duration};

use thiserror::Error;

/// Connection-level failure classes reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    TimedOut,
    Reset,
    Refused,
    Other,
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::TimedOut => "timed out",
            ConnectionKind::Reset => "reset",
            ConnectionKind::Refused => "refused",
            ConnectionKind::Other => "failed",
        }
    }

    pub fn from_io(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::TimedOut => ConnectionKind::TimedOut,
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                ConnectionKind::Reset
            }
            io::ErrorKind::ConnectionRefused => ConnectionKind::Refused,
            _ => ConnectionKind::Other,
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("DNS lookup for '{host}' failed: {source}")]
    Dns {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("request to {url} failed with status {status}: {body}")]
    HttpStatus { url: String, status: u16, body: String },

    #[error("failed to parse JSON from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("connection {kind}: {message}")]
    Connection { kind: ConnectionKind, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no location found for '{0}'")]
    CityNotFound(String),

    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("WEATHER_API_KEY is not set")]
    MissingCredential,
}

impl WeatherError {
    pub fn connection(kind: ConnectionKind, message: impl Into<String>) -> Self {
        WeatherError::Connection { kind, message: message.into() }
    }

    /// Transient failures that the fetcher retries locally.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WeatherError::Timeout(_)
                | WeatherError::Connection {
                    kind: ConnectionKind::TimedOut | ConnectionKind::Reset,
                    ..
                }
        )
    }

    /// Network-class failures that send the orchestrator to the fallback provider.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            WeatherError::Dns { .. }
                | WeatherError::Timeout(_)
                | WeatherError::Connection { .. }
        )
    }

    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            WeatherError::Dns { .. } => &[
                "Check that you are connected to the internet.",
                "Check your DNS settings, VPN or proxy configuration.",
            ],
            WeatherError::Connection { kind: ConnectionKind::Refused, .. } => &[
                "The weather service refused the connection; a firewall or proxy may be blocking it.",
                "Run `weather --test` to diagnose connectivity.",
            ],
            WeatherError::Connection { .. } | WeatherError::Timeout(_) => &[
                "The network or the weather service is slow or unstable; try again in a moment.",
                "Run `weather --test` to diagnose connectivity.",
            ],
            WeatherError::HttpStatus { .. } => {
                &["The weather service returned an error; it may be temporarily unavailable."]
            }
            WeatherError::Parse { .. } => {
                &["The weather service sent an unexpected response; try again later."]
            }
            WeatherError::CityNotFound(_) => &[
                "Check the spelling of the city name.",
                "Try the English name of the city, e.g. `weather Munich`.",
            ],
            WeatherError::MissingField(_) => {
                &["The forecast service has no current conditions for this location right now."]
            }
            WeatherError::MissingCredential => &[
                "Get a free API key at https://www.weatherapi.com/signup.aspx",
                "Then run: export WEATHER_API_KEY=<your key>",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_connection_errors_are_retryable() {
        assert!(WeatherError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(WeatherError::connection(ConnectionKind::Reset, "reset").is_retryable());
        assert!(WeatherError::connection(ConnectionKind::TimedOut, "slow").is_retryable());

        assert!(!WeatherError::connection(ConnectionKind::Refused, "refused").is_retryable());
        assert!(
            !WeatherError::HttpStatus { url: "u".into(), status: 503, body: String::new() }
                .is_retryable()
        );
        assert!(!WeatherError::MissingField("current_weather").is_retryable());
    }

    #[test]
    fn fallback_only_for_network_class_errors() {
        let dns = WeatherError::Dns {
            host: "google.com".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such host"),
        };
        assert!(dns.triggers_fallback());
        assert!(!dns.is_retryable());
        assert!(WeatherError::Timeout(Duration::from_secs(10)).triggers_fallback());
        assert!(WeatherError::connection(ConnectionKind::Refused, "refused").triggers_fallback());

        assert!(!WeatherError::CityNotFound("Zzzznotacity".into()).triggers_fallback());
        assert!(!WeatherError::MissingField("current_weather").triggers_fallback());
        assert!(
            !WeatherError::HttpStatus { url: "u".into(), status: 404, body: String::new() }
                .triggers_fallback()
        );
    }

    #[test]
    fn io_kinds_map_to_connection_kinds() {
        assert_eq!(ConnectionKind::from_io(io::ErrorKind::ConnectionReset), ConnectionKind::Reset);
        assert_eq!(
            ConnectionKind::from_io(io::ErrorKind::ConnectionRefused),
            ConnectionKind::Refused
        );
        assert_eq!(ConnectionKind::from_io(io::ErrorKind::TimedOut), ConnectionKind::TimedOut);
        assert_eq!(ConnectionKind::from_io(io::ErrorKind::Other), ConnectionKind::Other);
    }

    #[test]
    fn missing_credential_hints_explain_setup() {
        let hints = WeatherError::MissingCredential.hints();
        assert!(hints.iter().any(|h| h.contains("WEATHER_API_KEY")));
    }
}
