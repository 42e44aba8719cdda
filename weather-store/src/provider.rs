use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::warn;

use crate::{
    error::ProviderError,
    model::{Coordinates, CurrentConditions, ForecastEntry},
};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Location input shared by both provider lookups of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    Place(String),
}

impl LocationQuery {
    /// Query parameters identifying the location.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            LocationQuery::Place(name) => vec![("q", name.clone())],
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Coordinates(c) => write!(f, "{:.4},{:.4}", c.latitude, c.longitude),
            LocationQuery::Place(name) => f.write_str(name),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(&self, query: &LocationQuery) -> Result<CurrentConditions, ProviderError>;

    /// The full forecast feed, in provider order.
    async fn forecast(&self, query: &LocationQuery) -> Result<Vec<ForecastEntry>, ProviderError>;
}

/// Current conditions for several cities; failed lookups are skipped.
pub async fn current_for_places<P>(provider: &P, places: &[String]) -> Vec<(String, CurrentConditions)>
where
    P: WeatherProvider + ?Sized,
{
    let mut results = Vec::with_capacity(places.len());

    for place in places {
        let query = LocationQuery::Place(place.clone());
        match provider.current_conditions(&query).await {
            Ok(current) => results.push((place.clone(), current)),
            Err(err) => warn!(place = %place, error = %err, "Skipping city"),
        }
    }

    results
}
