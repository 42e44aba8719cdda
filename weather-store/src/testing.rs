//! In-memory provider and geolocator doubles for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    error::{LocationError, ProviderError},
    location::{Geolocator, Permission},
    model::{Condition, Coordinates, CurrentConditions, ForecastEntry},
    provider::{LocationQuery, WeatherProvider},
};

#[derive(Debug, Default)]
pub struct StubProvider {
    current_queries: Mutex<Vec<LocationQuery>>,
    forecast_queries: Mutex<Vec<LocationQuery>>,
    fail_current: AtomicBool,
    fail_forecast: AtomicBool,
    delays: Mutex<HashMap<String, Duration>>,
}

impl StubProvider {
    pub fn fail_current(&self, fail: bool) {
        self.fail_current.store(fail, Ordering::SeqCst);
    }

    pub fn fail_forecast(&self, fail: bool) {
        self.fail_forecast.store(fail, Ordering::SeqCst);
    }

    /// Both lookups for `place` sleep for `delay` before answering.
    pub fn delay_place(&self, place: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(place.to_string(), delay);
    }

    pub fn current_queries(&self) -> Vec<LocationQuery> {
        self.current_queries.lock().unwrap().clone()
    }

    pub fn forecast_queries(&self) -> Vec<LocationQuery> {
        self.forecast_queries.lock().unwrap().clone()
    }

    async fn wait_for(&self, query: &LocationQuery) {
        let delay = match query {
            LocationQuery::Place(name) => self.delays.lock().unwrap().get(name).copied(),
            LocationQuery::Coordinates(_) => None,
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn failure(endpoint: &'static str) -> ProviderError {
    ProviderError::Status { endpoint, status: 500, body: "boom".to_string() }
}

fn forecast_entry(text: &str, ts: i64) -> ForecastEntry {
    ForecastEntry {
        time: DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now),
        time_text: text.to_string(),
        temperature_c: 25.0,
        humidity_pct: 70,
        wind_speed_mps: 3.0,
        condition: Condition::Rain,
        description: "light rain".to_string(),
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn current_conditions(&self, query: &LocationQuery) -> Result<CurrentConditions, ProviderError> {
        self.current_queries.lock().unwrap().push(query.clone());
        self.wait_for(query).await;

        if self.fail_current.load(Ordering::SeqCst) {
            return Err(failure("weather"));
        }

        let location_name = match query {
            LocationQuery::Place(name) => name.clone(),
            LocationQuery::Coordinates(_) => "Here".to_string(),
        };

        Ok(CurrentConditions {
            location_name,
            observation_time: Utc::now(),
            temperature_c: 28.3,
            feels_like_c: 31.0,
            humidity_pct: 78,
            wind_speed_mps: 10.0,
            sunrise: DateTime::from_timestamp(1_704_088_800, 0),
            sunset: DateTime::from_timestamp(1_704_132_000, 0),
            condition: Condition::Clouds,
            description: "broken clouds".to_string(),
        })
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<Vec<ForecastEntry>, ProviderError> {
        self.forecast_queries.lock().unwrap().push(query.clone());
        self.wait_for(query).await;

        if self.fail_forecast.load(Ordering::SeqCst) {
            return Err(failure("forecast"));
        }

        Ok(vec![
            forecast_entry("2024-01-01 00:00:00", 1_704_067_200),
            forecast_entry("2024-01-01 12:00:00", 1_704_110_400),
            forecast_entry("2024-01-02 12:00:00", 1_704_196_800),
            forecast_entry("2024-01-02 18:00:00", 1_704_218_400),
        ])
    }
}

#[derive(Debug)]
pub struct StubGeolocator {
    permission: Permission,
    position: Option<Coordinates>,
}

impl StubGeolocator {
    pub fn granted(position: Coordinates) -> Self {
        Self { permission: Permission::Granted, position: Some(position) }
    }

    pub fn denied() -> Self {
        Self { permission: Permission::Denied, position: None }
    }

    /// Permission granted but no position fix can be obtained.
    pub fn no_fix() -> Self {
        Self { permission: Permission::Granted, position: None }
    }
}

#[async_trait]
impl Geolocator for StubGeolocator {
    async fn request_permission(&self) -> Result<Permission, LocationError> {
        Ok(self.permission)
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.position.ok_or(LocationError::NoFix)
    }
}
