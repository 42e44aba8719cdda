//! Core library for the `weather-watch` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and the device-location abstraction
//! - The weather store: latest snapshot, fetch state, periodic refresh
//!
//! It is used by `weather-watch`, but can also be embedded by other front ends.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{Config, HomeLocation};
pub use error::{LocationError, ProviderError, RefreshError, StoreError};
pub use location::{FixedGeolocator, Geolocator, Permission};
pub use model::{
    Condition, Coordinates, CurrentConditions, FetchState, ForecastEntry, PlaceSelector,
    WeatherSnapshot,
};
pub use provider::{LocationQuery, OpenWeatherProvider, WeatherProvider};
pub use refresh::{DEFAULT_REFRESH_INTERVAL, RefreshHandle, spawn_refresh, spawn_refresh_from};
pub use store::{StoreState, WeatherStore};
