//! The weather store: latest snapshot, fetch status and the place to refresh.
//!
//! State lives in a [`watch`] channel so consumers either read the latest
//! committed [`StoreState`] or subscribe to changes. Every mutation happens in
//! a single `send_modify`, which means a reader never observes a half-applied
//! fetch result.
//!
//! Overlapping fetches are allowed. Whichever completes last overwrites the
//! snapshot, even if it was started first.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::StoreError,
    location::{Geolocator, Permission},
    model::{FetchState, PlaceSelector, WeatherSnapshot, noon_forecast},
    provider::{LocationQuery, WeatherProvider},
};

/// Everything a consumer of the store may look at.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub snapshot: Option<Arc<WeatherSnapshot>>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Place of the last successful fetch.
    pub selector: PlaceSelector,
    in_flight: usize,
}

impl StoreState {
    pub fn fetch_state(&self) -> FetchState {
        if self.loading {
            FetchState::Loading
        } else if let Some(message) = &self.error {
            FetchState::Error(message.clone())
        } else {
            FetchState::Idle
        }
    }

    fn begin_fetch(&mut self) {
        self.in_flight += 1;
        self.loading = true;
        self.error = None;
    }

    fn end_fetch(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
    }
}

#[derive(Debug)]
pub struct WeatherStore {
    provider: Arc<dyn WeatherProvider>,
    geolocator: Arc<dyn Geolocator>,
    state: watch::Sender<StoreState>,
}

impl WeatherStore {
    pub fn new(provider: Arc<dyn WeatherProvider>, geolocator: Arc<dyn Geolocator>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { provider, geolocator, state }
    }

    /// Fetch weather for `place`, or for the device location when `place` is `None`.
    ///
    /// On success the snapshot is replaced wholesale and `place` becomes the
    /// selector for later refreshes. On failure the previous snapshot is kept
    /// and the error message is recorded in the state.
    pub async fn fetch(&self, place: Option<&str>) -> Result<Arc<WeatherSnapshot>, StoreError> {
        self.fetch_selector(PlaceSelector::from_place(place)).await
    }

    /// Repeat the last successful fetch's place.
    pub async fn refresh(&self) -> Result<Arc<WeatherSnapshot>, StoreError> {
        let selector = self.selector();
        self.fetch_selector(selector).await
    }

    #[instrument(skip(self, selector), fields(place = %selector))]
    pub async fn fetch_selector(
        &self,
        selector: PlaceSelector,
    ) -> Result<Arc<WeatherSnapshot>, StoreError> {
        let guard = InFlight::begin(&self.state);

        let outcome = self.load(&selector).await.map(Arc::new);

        match &outcome {
            Ok(snapshot) => {
                info!(
                    location = %snapshot.current.location_name,
                    forecast_days = snapshot.forecast.len(),
                    "Weather snapshot updated"
                );
                let snapshot = Arc::clone(snapshot);
                guard.finish(move |state| {
                    state.snapshot = Some(snapshot);
                    state.last_updated = Some(Utc::now());
                    state.selector = selector;
                    state.error = None;
                });
            }
            Err(err) => {
                warn!(error = %err, "Weather fetch failed");
                let message = err.user_message().to_string();
                guard.finish(move |state| state.error = Some(message));
            }
        }

        outcome
    }

    async fn load(&self, selector: &PlaceSelector) -> Result<WeatherSnapshot, StoreError> {
        let query = match selector {
            PlaceSelector::CurrentLocation => {
                if self.geolocator.request_permission().await? == Permission::Denied {
                    return Err(StoreError::PermissionDenied);
                }
                LocationQuery::Coordinates(self.geolocator.current_position().await?)
            }
            PlaceSelector::Named(name) => LocationQuery::Place(name.clone()),
        };

        debug!(location = %query, "Querying current conditions and forecast");

        let (current, forecast) = tokio::try_join!(
            self.provider.current_conditions(&query),
            self.provider.forecast(&query),
        )?;

        Ok(WeatherSnapshot { current, forecast: noon_forecast(forecast) })
    }

    pub fn state(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Option<Arc<WeatherSnapshot>> {
        self.state.borrow().snapshot.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_updated
    }

    pub fn selector(&self) -> PlaceSelector {
        self.state.borrow().selector.clone()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.state.borrow().fetch_state()
    }
}

/// Marks one fetch as in flight; releases it on drop if the fetch future is cancelled.
struct InFlight<'a> {
    state: &'a watch::Sender<StoreState>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a watch::Sender<StoreState>) -> Self {
        state.send_modify(StoreState::begin_fetch);
        Self { state, finished: false }
    }

    fn finish(mut self, apply: impl FnOnce(&mut StoreState)) {
        self.finished = true;
        self.state.send_modify(|state| {
            state.end_fetch();
            apply(state);
        });
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.send_modify(StoreState::end_fetch);
        }
    }
}
