use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-of-day marker the provider uses for its midday forecast sample.
pub const NOON_MARKER: &str = "12:00:00";

/// Categorical weather label, as reported in the provider's `main` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Other(String),
}

impl Condition {
    pub fn from_main(main: &str) -> Self {
        match main {
            "Clear" => Condition::Clear,
            "Clouds" => Condition::Clouds,
            "Rain" => Condition::Rain,
            "Drizzle" => Condition::Drizzle,
            "Thunderstorm" => Condition::Thunderstorm,
            "Snow" => Condition::Snow,
            "Mist" => Condition::Mist,
            "Fog" => Condition::Fog,
            other => Condition::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::Clear => "Clear",
            Condition::Clouds => "Clouds",
            Condition::Rain => "Rain",
            Condition::Drizzle => "Drizzle",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::Snow => "Snow",
            Condition::Mist => "Mist",
            Condition::Fog => "Fog",
            Condition::Other(s) => s,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Current conditions at the queried location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub observation_time: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub condition: Condition,
    pub description: String,
}

impl CurrentConditions {
    pub fn wind_speed_kmh(&self) -> f64 {
        mps_to_kmh(self.wind_speed_mps)
    }

    pub fn rounded_temperature(&self) -> i64 {
        self.temperature_c.round() as i64
    }
}

/// One sample of the 3-hourly forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    /// Timestamp text exactly as the provider sent it, e.g. `2024-01-01 12:00:00`.
    pub time_text: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: Condition,
    pub description: String,
}

impl ForecastEntry {
    pub fn is_noon(&self) -> bool {
        self.time_text.contains(NOON_MARKER)
    }

    pub fn wind_speed_kmh(&self) -> f64 {
        mps_to_kmh(self.wind_speed_mps)
    }
}

/// Keep only the midday samples, in the order the provider returned them.
pub fn noon_forecast(entries: Vec<ForecastEntry>) -> Vec<ForecastEntry> {
    entries.into_iter().filter(ForecastEntry::is_noon).collect()
}

/// Converts meters per second to km/h, rounded to one decimal place.
pub fn mps_to_kmh(mps: f64) -> f64 {
    (mps * 3.6 * 10.0).round() / 10.0
}

/// Complete result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastEntry>,
}

/// Place a fetch was made for; remembered so periodic refreshes repeat it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaceSelector {
    #[default]
    CurrentLocation,
    Named(String),
}

impl PlaceSelector {
    /// `None` and blank names both mean the device location.
    pub fn from_place(place: Option<&str>) -> Self {
        match place.map(str::trim) {
            Some(name) if !name.is_empty() => PlaceSelector::Named(name.to_string()),
            _ => PlaceSelector::CurrentLocation,
        }
    }
}

impl fmt::Display for PlaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceSelector::CurrentLocation => f.write_str("current location"),
            PlaceSelector::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Error(String),
}
