use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use forecast_core::{ClientConfig, Config, ForecastService, OpenWeatherClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Poltava weather forecast CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Show current conditions in Poltava.
    Current,

    /// Show the daily 09:00 forecast for a date range.
    Forecast {
        /// First day, YYYY-MM-DD.
        #[arg(long)]
        from: String,

        /// Last day, YYYY-MM-DD; defaults to `from`.
        #[arg(long)]
        to: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current => current().await,
            Command::Forecast { from, to } => forecast(&from, to.as_deref()).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Text::new("OpenWeatherMap API key:")
        .prompt()
        .context("Failed to read API key")?;

    config.api_key = Some(key);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn client_from_config() -> Result<OpenWeatherClient> {
    let config = Config::load()?;
    Ok(OpenWeatherClient::with_config(config.apply(ClientConfig::default())))
}

async fn current() -> Result<()> {
    let client = client_from_config()?;

    match client.get_current().await {
        Some(entry) => print_entry(&entry),
        None => println!("Current weather is unavailable."),
    }

    Ok(())
}

async fn forecast(from: &str, to: Option<&str>) -> Result<()> {
    let from = parse_date(from)?;
    let to = match to {
        Some(s) => parse_date(s)?,
        None => from,
    };

    let client = client_from_config()?;
    let entries = client.get_forecast(from, to).await;

    if entries.is_empty() {
        println!("No forecast data for the requested range.");
        return Ok(());
    }

    for entry in entries {
        print_entry(&entry);
    }

    Ok(())
}

fn print_entry(entry: &forecast_core::ForecastEntry) {
    let icon = if entry.image_base64.is_empty() { "   " } else { "png" };

    println!(
        "{}  {:>6.1}°C  {}  {}",
        entry.date.format("%Y-%m-%d %H:%M"),
        entry.temp,
        icon,
        entry.description,
    );
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_days() {
        let day = parse_date("2024-01-31").expect("valid date");
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 1, 31).expect("valid date"));
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("31.01.2024").is_err());
    }
}
