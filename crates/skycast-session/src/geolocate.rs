//! Geolocation-to-city resolution.
//!
//! A [`LocationProvider`] yields coordinates; [`reverse_geocode`] turns them
//! into a city name over HTTP. Every failure path collapses to `None` so the
//! caller can fall back to a default city.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// A geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Source of the device's current position.
pub trait LocationProvider {
    fn locate(&self) -> impl std::future::Future<Output = Option<Coordinates>> + Send;
}

/// Default provider. There is no positioning backend here, so it always
/// reports unavailable and resolution falls through to the default city.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocator;

impl LocationProvider for SystemLocator {
    async fn locate(&self) -> Option<Coordinates> {
        tracing::debug!("No positioning backend available");
        None
    }
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    city: Option<String>,
    locality: Option<String>,
}

/// Reverse geocode coordinates to a city name.
/// Returns `None` on failure or timeout; the caller falls back to a default.
pub async fn reverse_geocode(endpoint: &str, coordinates: Coordinates) -> Option<String> {
    let client = match Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to create geocoding client: {}", e);
            return None;
        }
    };

    let response = match client
        .get(endpoint)
        .query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("localityLanguage", "en".to_string()),
        ])
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Reverse geocode request failed: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Reverse geocode returned status {}", response.status());
        return None;
    }

    let body: ReverseGeocodeResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("Reverse geocode parse error: {}", e);
            return None;
        }
    };

    // Prefer the city name, fall back to the broader locality
    let place = body
        .city
        .filter(|c| !c.is_empty())
        .or_else(|| body.locality.filter(|l| !l.is_empty()))?;

    tracing::info!("Reverse geocoded to: {}", place);
    Some(place)
}

/// Resolve the user's current city, falling back to `default_city` when the
/// position is unavailable or reverse geocoding fails for any reason.
pub async fn resolve_city<L: LocationProvider>(
    locator: &L,
    geocode_url: &str,
    default_city: &str,
) -> String {
    match locator.locate().await {
        Some(coordinates) => reverse_geocode(geocode_url, coordinates)
            .await
            .unwrap_or_else(|| default_city.to_string()),
        None => default_city.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticLocator(Option<Coordinates>);

    impl LocationProvider for StaticLocator {
        async fn locate(&self) -> Option<Coordinates> {
            self.0
        }
    }

    const SEATTLE: Coordinates = Coordinates {
        latitude: 47.6062,
        longitude: -122.3321,
    };

    #[tokio::test]
    async fn test_reverse_geocode_prefers_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("localityLanguage", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": "Seattle",
                "locality": "King County"
            })))
            .mount(&server)
            .await;

        let name = reverse_geocode(&server.uri(), SEATTLE).await;
        assert_eq!(name.as_deref(), Some("Seattle"));
    }

    #[tokio::test]
    async fn test_reverse_geocode_falls_back_to_locality() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": "",
                "locality": "King County"
            })))
            .mount(&server)
            .await;

        let name = reverse_geocode(&server.uri(), SEATTLE).await;
        assert_eq!(name.as_deref(), Some("King County"));
    }

    #[tokio::test]
    async fn test_reverse_geocode_http_error_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(reverse_geocode(&server.uri(), SEATTLE).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_city_without_position_uses_default() {
        let city = resolve_city(&StaticLocator(None), "http://unused.invalid", "Coimbatore").await;
        assert_eq!(city, "Coimbatore");
    }

    #[tokio::test]
    async fn test_resolve_city_with_position_uses_geocoder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": "Seattle",
                "locality": null
            })))
            .mount(&server)
            .await;

        let city = resolve_city(&StaticLocator(Some(SEATTLE)), &server.uri(), "Coimbatore").await;
        assert_eq!(city, "Seattle");
    }

    #[tokio::test]
    async fn test_resolve_city_geocode_failure_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let city = resolve_city(&StaticLocator(Some(SEATTLE)), &server.uri(), "Coimbatore").await;
        assert_eq!(city, "Coimbatore");
    }

    #[tokio::test]
    async fn test_system_locator_is_unavailable() {
        assert!(SystemLocator.locate().await.is_none());
    }
}
