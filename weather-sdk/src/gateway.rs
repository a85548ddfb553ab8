use std::fmt::Debug;

use async_trait::async_trait;

use crate::{error::FetchError, model::Weather};

pub mod openweather;

pub use openweather::OpenWeatherGateway;

/// Source of current weather for a location.
///
/// Implementations only translate transport and status outcomes into
/// [`FetchError`]; caching is the caller's job.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    async fn fetch(&self, credential: &str, location: &str) -> Result<Weather, FetchError>;
}

/// Map a non-success HTTP status to the error taxonomy.
pub(crate) fn classify_status(status: u16, location: &str, body: &str) -> FetchError {
    match status {
        401 => FetchError::InvalidCredential,
        404 => FetchError::NotFound(location.to_owned()),
        _ => FetchError::RemoteError {
            status,
            body: truncate_body(body),
        },
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_is_invalid_credential() {
        assert_eq!(classify_status(401, "London", ""), FetchError::InvalidCredential);
    }

    #[test]
    fn status_404_names_the_location() {
        assert_eq!(
            classify_status(404, "Atlantis", r#"{"cod":"404"}"#),
            FetchError::NotFound("Atlantis".into())
        );
    }

    #[test]
    fn other_status_keeps_code_and_body() {
        assert_eq!(
            classify_status(500, "London", "boom"),
            FetchError::RemoteError { status: 500, body: "boom".into() }
        );
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);

        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
