//! Caching client for the OpenWeather current-weather API.
//!
//! This crate defines:
//! - A per-credential registry so each API key backs at most one live client
//! - A bounded, insertion-ordered cache with a validity window
//! - The gateway abstraction over the HTTP service, with an OpenWeather implementation
//! - On-demand and background-polling refresh
//! - On-disk configuration for the `weather` CLI
//!
//! It is used by `weather-cli`, but can also be embedded in other binaries or services.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod refresh;
pub mod registry;

pub use cache::{CacheConfig, CacheEntry, TtlCache};
pub use client::{ClientBuilder, WeatherClient};
pub use config::Config;
pub use error::{FetchError, Result, WeatherError};
pub use gateway::{OpenWeatherGateway, WeatherGateway};
pub use model::{Mode, Weather};
pub use refresh::RefreshSummary;
pub use registry::Registry;
