use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::{
    cache::CacheConfig,
    error::{Result, WeatherError},
    gateway::{
        OpenWeatherGateway, WeatherGateway,
        openweather::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT},
    },
    model::{Mode, Weather},
    refresh::{DEFAULT_POLL_INTERVAL, Poller, RefreshSummary, Refresher},
    registry::Registry,
};

/// A caching weather client bound to one API key.
///
/// Only one live client per API key may exist in a [`Registry`]. The key is
/// released by [`dispose`](WeatherClient::dispose) or when the client is
/// dropped.
///
/// ```no_run
/// # async fn demo() -> weather_sdk::Result<()> {
/// use weather_sdk::{Mode, WeatherClient};
///
/// let client = WeatherClient::new("API_KEY", Mode::OnDemand)?;
/// let weather = client.query("London").await?;
/// if let Some(temp) = weather.temperature() {
///     println!("{}: {temp:.1}°C", weather.name());
/// }
/// client.dispose();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WeatherClient {
    refresher: Arc<Refresher>,
    mode: Mode,
    registry: Registry,
    poller: Option<Poller>,
}

impl WeatherClient {
    /// Build a client against the process-wide registry and OpenWeather.
    /// Polling mode must be called from within a Tokio runtime.
    pub fn new(credential: impl Into<String>, mode: Mode) -> Result<Self> {
        Self::builder(credential, mode).build()
    }

    pub fn builder(credential: impl Into<String>, mode: Mode) -> ClientBuilder {
        ClientBuilder::new(credential, mode)
    }

    /// Current weather for `location`, from the cache when fresh.
    ///
    /// Blank locations fail with [`WeatherError::EmptyKey`] without touching
    /// the cache or the network.
    pub async fn query(&self, location: &str) -> Result<Weather> {
        if location.trim().is_empty() {
            return Err(WeatherError::EmptyKey);
        }
        self.refresher.get_or_fetch(location).await
    }

    /// Re-fetch every cached location now, the same sweep the background
    /// task runs. Failures are logged and counted, not returned.
    pub async fn refresh_now(&self) -> RefreshSummary {
        self.refresher.refresh_all().await
    }

    /// Stop background refresh, release the API key and clear the cache.
    /// Calling it again does nothing.
    pub fn dispose(&self) {
        if !self.refresher.dispose() {
            return;
        }
        if let Some(poller) = &self.poller {
            poller.stop();
        }
        self.registry.unregister(self.refresher.credential());
        info!(mode = %self.mode, "weather client disposed");
    }

    pub fn credential(&self) -> &str {
        self.refresher.credential()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_disposed(&self) -> bool {
        self.refresher.is_disposed()
    }

    /// Whether a background refresh task is still running.
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    pub fn cached_len(&self) -> usize {
        self.refresher.cached_len()
    }

    /// Cached locations, least-recently-stored first.
    pub fn cached_locations(&self) -> Vec<String> {
        self.refresher.cached_locations()
    }
}

impl Drop for WeatherClient {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Configures and builds a [`WeatherClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    credential: String,
    mode: Mode,
    registry: Option<Registry>,
    gateway: Option<Arc<dyn WeatherGateway>>,
    cache: CacheConfig,
    poll_interval: Duration,
    base_url: String,
    timeout: Duration,
}

impl ClientBuilder {
    pub fn new(credential: impl Into<String>, mode: Mode) -> Self {
        Self {
            credential: credential.into(),
            mode,
            registry: None,
            gateway: None,
            cache: CacheConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Register in `registry` instead of [`Registry::global`].
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom gateway. Overrides `base_url` and `timeout`.
    pub fn gateway(mut self, gateway: Arc<dyn WeatherGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Claim the API key and, in polling mode, start the background task.
    ///
    /// Fails with [`WeatherError::HttpClient`] before claiming the key if the
    /// HTTP client can't be built. If the task can't be started the key is
    /// released again.
    pub fn build(self) -> Result<WeatherClient> {
        let gateway: Arc<dyn WeatherGateway> = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(
                OpenWeatherGateway::with_base_url(self.base_url, self.timeout)
                    .map_err(|e| WeatherError::HttpClient(e.to_string()))?,
            ),
        };

        let registry = self.registry.unwrap_or_else(|| Registry::global().clone());
        registry.register(&self.credential)?;
        let refresher = Arc::new(Refresher::new(self.credential, gateway, self.cache));

        let poller = match self.mode {
            Mode::OnDemand => None,
            Mode::Polling => match Poller::spawn(refresher.clone(), self.poll_interval) {
                Ok(poller) => Some(poller),
                Err(err) => {
                    registry.unregister(refresher.credential());
                    return Err(err);
                }
            },
        };

        info!(mode = %self.mode, capacity = self.cache.capacity, "weather client created");

        Ok(WeatherClient {
            refresher,
            mode: self.mode,
            registry,
            poller,
        })
    }
}
