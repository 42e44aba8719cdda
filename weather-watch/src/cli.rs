use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use std::{sync::Arc, time::Duration};
use tracing::info;
use weather_store::{
    Config, FixedGeolocator, HomeLocation, PlaceSelector, WeatherStore, provider::current_for_places,
    spawn_refresh_from,
};

use crate::render;

/// Cities shown by `cities` when none are given.
const POPULAR_CITIES: &[&str] = &["Lagos", "New York", "London", "Tokyo", "Dubai", "Paris"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-watch", version, about = "Current weather and midday forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home location.
    Configure,

    /// Fetch once and print the weather.
    Show {
        /// City name; if absent, the configured home location is used.
        #[arg(long)]
        city: Option<String>,
    },

    /// Keep the weather up to date, printing every change until Ctrl-C.
    Watch {
        /// City to start with; if absent, the configured home location is used.
        #[arg(long)]
        city: Option<String>,

        /// Refresh period in seconds (defaults to the configured interval).
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Current conditions for several cities.
    Cities {
        /// City names; defaults to a list of popular cities.
        names: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(city).await,
            Command::Watch { city, interval } => watch(city, interval).await,
            Command::Cities { names } => cities(names).await,
        }
    }
}

fn build_store(config: &Config) -> anyhow::Result<WeatherStore> {
    let provider = config.provider()?;
    let geolocator = FixedGeolocator::new(config.home_coordinates());

    Ok(WeatherStore::new(Arc::new(provider), Arc::new(geolocator)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.set_api_key(api_key.trim().to_string());

    let set_home = Confirm::new("Set a home location for device-location lookups?")
        .with_default(config.home.is_some())
        .prompt()?;

    if set_home {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        config.home = Some(HomeLocation { latitude, longitude });
    } else {
        config.home = None;
    }

    config.validate()?;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let store = build_store(&config)?;

    match store.fetch(city.as_deref()).await {
        Ok(snapshot) => {
            print!("{}", render::snapshot(&snapshot, store.last_updated()));
            Ok(())
        }
        Err(e) => {
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

async fn watch(city: Option<String>, interval: Option<u64>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let store = Arc::new(build_store(&config)?);

    let interval = match interval {
        Some(0) => return Err(anyhow!("--interval must be greater than zero")),
        Some(secs) => Duration::from_secs(secs),
        None => config.refresh_interval(),
    };

    let mut updates = store.subscribe();
    let handle = spawn_refresh_from(
        Arc::clone(&store),
        interval,
        PlaceSelector::from_place(city.as_deref()),
    )?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print!("{}", render::state(&state));
            }
            _ = &mut shutdown => {
                info!("Received Ctrl-C, stopping refresh");
                break;
            }
        }
    }

    handle.stop();
    Ok(())
}

async fn cities(names: Vec<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = config.provider()?;

    let names = if names.is_empty() {
        POPULAR_CITIES.iter().map(|c| c.to_string()).collect()
    } else {
        names
    };

    let results = current_for_places(&provider, &names).await;
    if results.is_empty() {
        return Err(anyhow!("Could not fetch weather for any of the requested cities"));
    }

    for (name, current) in &results {
        println!("{}", render::city_line(name, current));
    }

    Ok(())
}
