//! Shared test gateway: scripted answers per location, counts calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use weather_sdk::{FetchError, Weather, WeatherGateway};

#[derive(Debug, Default)]
pub struct ScriptedGateway {
    calls: AtomicUsize,
    per_location: Mutex<HashMap<String, usize>>,
    failures: Mutex<HashMap<String, FetchError>>,
}

#[allow(dead_code)]
impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every fetch of `location` fail with `err` until cleared.
    pub fn fail(&self, location: &str, err: FetchError) {
        self.failures.lock().insert(location.to_owned(), err);
    }

    pub fn recover(&self, location: &str) {
        self.failures.lock().remove(location);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, location: &str) -> usize {
        self.per_location.lock().get(location).copied().unwrap_or(0)
    }
}

#[async_trait]
impl WeatherGateway for ScriptedGateway {
    async fn fetch(&self, _credential: &str, location: &str) -> Result<Weather, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let n = {
            let mut per_location = self.per_location.lock();
            let n = per_location.entry(location.to_owned()).or_default();
            *n += 1;
            *n
        };

        if let Some(err) = self.failures.lock().get(location).cloned() {
            return Err(err);
        }

        // `dt` doubles as a fetch counter so tests can tell fresh data apart.
        Ok(Weather {
            name: Some(location.to_owned()),
            dt: Some(n as i64),
            ..Weather::default()
        })
    }
}
