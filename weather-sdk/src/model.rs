use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a [`WeatherClient`](crate::WeatherClient) keeps its cache fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Refresh only when a query finds a missing or stale entry.
    #[default]
    OnDemand,
    /// Refresh every cached location in the background on a fixed interval.
    Polling,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::OnDemand => "on-demand",
            Mode::Polling => "polling",
        }
    }

    pub const fn all() -> &'static [Mode] {
        &[Mode::OnDemand, Mode::Polling]
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Mode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "on-demand" | "on_demand" | "ondemand" => Ok(Mode::OnDemand),
            "polling" => Ok(Mode::Polling),
            _ => Err(anyhow::anyhow!(
                "Unknown mode '{value}'. Supported modes: on-demand, polling."
            )),
        }
    }
}

/// Current weather for one location, as returned by OpenWeather.
///
/// The fields the SDK reads are typed; everything else in the response body
/// lands in `extra`, so serializing a `Weather` gives back the body it was
/// decoded from. Fields the service left out stay `None` and are not written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Observation time, unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dt: Option<i64>,
    /// Shift from UTC in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<Temperature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Vec<Condition>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Temperature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    /// `pressure`, `temp_min`, `temp_max` and the like.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Weather {
    /// Resolved location name, empty if the service didn't send one.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn temperature(&self) -> Option<f64> {
        self.main.as_ref().and_then(|m| m.temp)
    }

    pub fn feels_like(&self) -> Option<f64> {
        self.main.as_ref().and_then(|m| m.feels_like)
    }

    pub fn humidity(&self) -> Option<u8> {
        self.main.as_ref().and_then(|m| m.humidity)
    }

    pub fn wind_speed(&self) -> Option<f64> {
        self.wind.as_ref().and_then(|w| w.speed)
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(unix_to_utc)
    }

    pub fn sunrise(&self) -> Option<DateTime<Utc>> {
        self.sys.as_ref().and_then(|s| s.sunrise).and_then(unix_to_utc)
    }

    pub fn sunset(&self) -> Option<DateTime<Utc>> {
        self.sys.as_ref().and_then(|s| s.sunset).and_then(unix_to_utc)
    }

    /// Short description of the first reported condition, e.g. "light rain".
    pub fn condition(&self) -> &str {
        self.weather
            .as_deref()
            .and_then(|w| w.first())
            .and_then(|c| c.description.as_deref())
            .unwrap_or("Unknown")
    }
}

// OpenWeather reports 0 for timestamps it doesn't have.
fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    if ts == 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(ts, 0)
}
