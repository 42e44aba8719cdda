//! Periodic refresh of a [`WeatherStore`].

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{error::RefreshError, model::PlaceSelector, store::WeatherStore};

/// Default refresh period: every five minutes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Owns the background refresh task. Dropping the handle cancels the timer.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the timer. Equivalent to dropping the handle.
    pub fn stop(self) {}
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the refresh task for `store`.
///
/// The task fetches for the device location right away, then every `interval`
/// repeats the fetch for the store's current selector. A refresh is not skipped
/// when a manual fetch is already running.
///
/// A zero `interval` is rejected before anything is spawned.
pub fn spawn_refresh(
    store: Arc<WeatherStore>,
    interval: Duration,
) -> Result<RefreshHandle, RefreshError> {
    spawn_refresh_from(store, interval, PlaceSelector::CurrentLocation)
}

/// Like [`spawn_refresh`], but the first fetch is made for `initial`.
pub fn spawn_refresh_from(
    store: Arc<WeatherStore>,
    interval: Duration,
    initial: PlaceSelector,
) -> Result<RefreshHandle, RefreshError> {
    if interval.is_zero() {
        return Err(RefreshError::ZeroInterval);
    }

    info!(
        interval_secs = interval.as_secs(),
        initial = %initial,
        "Starting weather refresh task"
    );

    let first_tick = Instant::now() + interval;

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(first_tick, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if let Err(e) = store.fetch_selector(initial).await {
            warn!(error = %e, "Initial weather fetch failed");
        }

        loop {
            ticker.tick().await;

            debug!(place = %store.selector(), "Running scheduled weather refresh");

            if let Err(e) = store.refresh().await {
                warn!(error = %e, "Scheduled weather refresh failed");
            }
        }
    });

    Ok(RefreshHandle { task })
}
