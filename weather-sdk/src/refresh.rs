//! Keeping a client's cache fresh.
//!
//! [`Refresher`] owns the cache lock and implements both refresh paths: the
//! lazy one behind every query and the sweep run by the background
//! [`Poller`]. The cache lock is never held across a gateway call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::{
    cache::{CacheConfig, TtlCache},
    error::WeatherError,
    gateway::WeatherGateway,
    model::Weather,
};

/// Default pause between two background refresh sweeps.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Outcome of one sweep over the cached locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
    /// Locations that left the cache while their refresh was in flight.
    pub skipped: usize,
}

#[derive(Debug)]
pub(crate) struct Refresher {
    credential: String,
    cache: Mutex<TtlCache<Weather>>,
    gateway: Arc<dyn WeatherGateway>,
    disposed: AtomicBool,
}

impl Refresher {
    pub(crate) fn new(
        credential: String,
        gateway: Arc<dyn WeatherGateway>,
        cache: CacheConfig,
    ) -> Self {
        Self {
            credential,
            cache: Mutex::new(TtlCache::with_config(cache)),
            gateway,
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn credential(&self) -> &str {
        &self.credential
    }

    /// Serve `location` from the cache, fetching and storing it on a miss.
    /// A failed fetch leaves the cache untouched.
    pub(crate) async fn get_or_fetch(&self, location: &str) -> Result<Weather, WeatherError> {
        if self.is_disposed() {
            return Err(WeatherError::Disposed);
        }

        let cached = self.cache.lock().lookup(location, Instant::now());
        if let Some(weather) = cached {
            debug!(location, "cache hit");
            return Ok(weather);
        }

        debug!(location, "cache miss, fetching");
        let weather = self.gateway.fetch(&self.credential, location).await?;
        self.store(location, weather.clone(), false);
        Ok(weather)
    }

    /// Re-fetch every cached location once, in store order.
    ///
    /// Per-location failures are logged and counted, never propagated.
    pub(crate) async fn refresh_all(&self) -> RefreshSummary {
        let locations = self.cache.lock().keys();
        let mut summary = RefreshSummary::default();

        for location in locations {
            match self.gateway.fetch(&self.credential, &location).await {
                Ok(weather) => {
                    if self.store(&location, weather, true) {
                        summary.refreshed += 1;
                    } else {
                        summary.skipped += 1;
                    }
                }
                Err(err) => {
                    warn!(location = %location, error = %err, "background refresh failed");
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Store under the lock unless the client was disposed meanwhile.
    /// With `only_if_present`, a location that has since been evicted or
    /// cleared is not reinserted.
    fn store(&self, location: &str, weather: Weather, only_if_present: bool) -> bool {
        let mut cache = self.cache.lock();
        if self.is_disposed() || (only_if_present && !cache.contains(location)) {
            return false;
        }
        cache.store(location, weather, Instant::now());
        true
    }

    pub(crate) fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    pub(crate) fn cached_locations(&self) -> Vec<String> {
        self.cache.lock().keys()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Mark disposed and drop every entry. Returns `false` if already disposed.
    pub(crate) fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.cache.lock().clear();
        true
    }
}

/// Handle to a background refresh task.
///
/// The task runs until [`Poller::stop`] is called or the handle is dropped.
/// It checks for the stop signal while sleeping and while a sweep is in
/// flight, so stopping never waits on the network.
#[derive(Debug)]
pub(crate) struct Poller {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Poller {
    pub(crate) fn spawn(refresher: Arc<Refresher>, interval: Duration) -> Result<Self, WeatherError> {
        let runtime = Handle::try_current().map_err(|_| WeatherError::NoRuntime)?;
        let (stop, stop_rx) = watch::channel(false);
        let task = runtime.spawn(poll_loop(refresher, interval, stop_rx));

        Ok(Self { stop, task })
    }

    pub(crate) fn stop(&self) {
        // Err only means the task already exited.
        let _ = self.stop.send(true);
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(refresher: Arc<Refresher>, interval: Duration, mut stop: watch::Receiver<bool>) {
    info!(interval_secs = interval.as_secs(), "background refresh started");

    loop {
        tokio::select! {
            _ = sleep(interval) => {}
            _ = stop.changed() => break,
        }

        tokio::select! {
            summary = refresher.refresh_all() => {
                debug!(
                    refreshed = summary.refreshed,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    "background refresh sweep finished"
                );
            }
            _ = stop.changed() => break,
        }
    }

    info!("background refresh stopped");
}
