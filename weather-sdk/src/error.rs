//! Error taxonomy for the SDK.

/// Why a single fetch from the weather service failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("invalid API key, please check your credential")]
    InvalidCredential,

    #[error("location '{0}' not found")]
    NotFound(String),

    #[error("weather service returned status {status}: {body}")]
    RemoteError { status: u16, body: String },

    /// Transport failure or a response body that could not be decoded.
    #[error("network error: {0}")]
    Network(String),
}

/// Errors returned by [`WeatherClient`](crate::WeatherClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherError {
    /// Carries no payload so the API key never ends up in logs or messages.
    #[error("a client with this API key is already active")]
    AlreadyActive,

    #[error("location name must not be empty")]
    EmptyKey,

    #[error("client has been disposed")]
    Disposed,

    #[error("polling mode requires a running Tokio runtime")]
    NoRuntime,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_converts_into_weather_error() {
        let err: WeatherError = FetchError::NotFound("Atlantis".into()).into();
        assert_eq!(err, WeatherError::Fetch(FetchError::NotFound("Atlantis".into())));
        assert_eq!(err.to_string(), "location 'Atlantis' not found");
    }

    #[test]
    fn remote_error_message_carries_status_and_body() {
        let err = FetchError::RemoteError { status: 503, body: "maintenance".into() };
        assert_eq!(err.to_string(), "weather service returned status 503: maintenance");
    }

    #[test]
    fn already_active_and_http_client_messages() {
        assert_eq!(
            WeatherError::AlreadyActive.to_string(),
            "a client with this API key is already active"
        );
        let err = WeatherError::HttpClient("no TLS backend".into());
        assert_eq!(err.to_string(), "failed to build HTTP client: no TLS backend");
    }
}
