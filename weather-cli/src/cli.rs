use std::{process::ExitCode, sync::Arc};

use clap::{CommandFactory, Parser};
use weather_core::{Config, WeatherService};

use crate::console::ConsoleObserver;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a city")]
pub struct Cli {
    /// City name, e.g. `weather New York`.
    pub city: Vec<String>,

    /// Check DNS resolution and weather API reachability, then exit.
    #[arg(long, conflicts_with = "city")]
    pub test: bool,

    /// Do not try the backup provider when the primary one is unreachable.
    #[arg(long)]
    pub no_fallback: bool,

    /// Print debug logs to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// City name with multiple words joined, or `None` when none was given.
    pub fn city_name(&self) -> Option<String> {
        let name = self.city.join(" ");
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config = Config::from_env().with_fallback(!self.no_fallback);
        let service = WeatherService::new(&config, Arc::new(ConsoleObserver));

        if self.test {
            let report = service.test_connectivity().await;
            let now = chrono::Local::now();
            println!("Connectivity check at {}", now.format("%Y-%m-%d %H:%M:%S"));
            for line in report.lines() {
                println!("  {line}");
            }
            return Ok(if report.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }

        let Some(city) = self.city_name() else {
            Cli::command().print_help()?;
            println!();
            return Ok(ExitCode::FAILURE);
        };

        match service.get_weather(&city).await {
            Some(_) => Ok(ExitCode::SUCCESS),
            None => Ok(ExitCode::FAILURE),
        }
    }
}
