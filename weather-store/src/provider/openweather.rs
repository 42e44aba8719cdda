use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::ProviderError,
    model::{Condition, CurrentConditions, ForecastEntry},
};

use super::{LocationQuery, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_UNITS: &str = "metric";

/// Client for the OpenWeather `weather` and `forecast` endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: DEFAULT_UNITS.to_string(),
            http: Client::new(),
        }
    }

    /// Builds a provider with an explicit endpoint root, unit system and request timeout.
    pub fn with_settings(
        api_key: String,
        base_url: impl Into<String>,
        units: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            units: units.into(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &LocationQuery,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut params = query.query_params();
        params.push(("units", self.units.clone()));
        params.push(("appid", self.api_key.clone()));

        debug!(url = %url, location = %query, "Requesting OpenWeather");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ProviderError::Parse { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

fn condition_of(weather: &[OwWeather]) -> (Condition, String) {
    match weather.first() {
        Some(w) => (
            Condition::from_main(&w.main),
            w.description.clone().unwrap_or_else(|| w.main.to_lowercase()),
        ),
        None => (Condition::Other("Unknown".to_string()), "unknown".to_string()),
    }
}

fn wind_speed(wind: Option<&OwWind>) -> f64 {
    wind.and_then(|w| w.speed).unwrap_or(0.0)
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition, description) = condition_of(&parsed.weather);
        let sys = parsed.sys.as_ref();

        CurrentConditions {
            location_name: parsed.name.unwrap_or_default(),
            observation_time: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like.unwrap_or(parsed.main.temp),
            humidity_pct: parsed.main.humidity.unwrap_or_default(),
            wind_speed_mps: wind_speed(parsed.wind.as_ref()),
            sunrise: sys.and_then(|s| s.sunrise).and_then(unix_to_utc),
            sunset: sys.and_then(|s| s.sunset).and_then(unix_to_utc),
            condition,
            description,
        }
    }
}

impl From<OwForecastEntry> for ForecastEntry {
    fn from(entry: OwForecastEntry) -> Self {
        let (condition, description) = condition_of(&entry.weather);

        ForecastEntry {
            time: unix_to_utc(entry.dt).unwrap_or_else(Utc::now),
            time_text: entry.dt_txt,
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity.unwrap_or_default(),
            wind_speed_mps: wind_speed(entry.wind.as_ref()),
            condition,
            description,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self, query), fields(location = %query))]
    async fn current_conditions(&self, query: &LocationQuery) -> Result<CurrentConditions, ProviderError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query).await?;
        Ok(parsed.into())
    }

    #[instrument(skip(self, query), fields(location = %query))]
    async fn forecast(&self, query: &LocationQuery) -> Result<Vec<ForecastEntry>, ProviderError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query).await?;
        debug!(samples = parsed.list.len(), "Received forecast feed");
        Ok(parsed.list.into_iter().map(ForecastEntry::from).collect())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_with_missing_optionals_parses() {
        let json = r#"{"dt": 1700000000, "main": {"temp": 21.4}, "weather": [{"main": "Clear"}]}"#;
        let parsed: OwCurrentResponse = serde_json::from_str(json).unwrap();
        let current = CurrentConditions::from(parsed);

        assert_eq!(current.location_name, "");
        assert_eq!(current.feels_like_c, 21.4);
        assert_eq!(current.humidity_pct, 0);
        assert_eq!(current.wind_speed_mps, 0.0);
        assert_eq!(current.sunrise, None);
        assert_eq!(current.condition, Condition::Clear);
        assert_eq!(current.description, "clear");
    }

    #[test]
    fn forecast_entry_keeps_provider_timestamp_text() {
        let json = r#"{
            "dt": 1704110400,
            "dt_txt": "2024-01-01 12:00:00",
            "main": {"temp": 3.0, "humidity": 81},
            "weather": [{"main": "Snow", "description": "light snow"}],
            "wind": {"speed": 4.1}
        }"#;
        let parsed: OwForecastEntry = serde_json::from_str(json).unwrap();
        let entry = ForecastEntry::from(parsed);

        assert_eq!(entry.time_text, "2024-01-01 12:00:00");
        assert!(entry.is_noon());
        assert_eq!(entry.condition, Condition::Snow);
        assert_eq!(entry.humidity_pct, 81);
        assert_eq!(entry.time, unix_to_utc(1704110400).unwrap());
    }

    #[test]
    fn empty_weather_list_maps_to_unknown() {
        let (condition, description) = condition_of(&[]);
        assert_eq!(condition, Condition::Other("Unknown".to_string()));
        assert_eq!(description, "unknown");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
