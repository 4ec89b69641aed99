//! Stateless HTTP wrapper around the remote weather API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::types::{
    CityConditions, CityInfo, Envelope, StatusMessage, UserSession, WeatherData, STATUS_SUCCESS,
};

/// Errors produced by [`WeatherClient`] operations.
///
/// A non-success `status` envelope ([`ApiError::Failed`]) is deliberately
/// indistinguishable in handling from a transport error: both mean the
/// operation failed and produced no data.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("API base URL cannot carry path segments: {0}")]
    InvalidBase(String),

    #[error("server responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("operation failed with status {0:?}")]
    Failed(String),
}

/// Typed client for the weather API.
///
/// Owns no session state; no retries here, retry policy is the caller's.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: Url,
    client: Arc<Client>,
}

impl WeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBase(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
        })
    }

    /// Build an endpoint URL from path segments (segments are
    /// percent-encoded, so city names with spaces are safe).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new(), so this always succeeds
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty().extend(segments);
        }
        url
    }

    /// Check response status and extract error
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Register a new session bound to its origin city.
    pub async fn create_session(&self, session_id: &str, city: &str) -> Result<UserSession, ApiError> {
        tracing::debug!("Registering session for {}", city);

        let body = UserSession {
            session_id: session_id.to_string(),
            city: city.to_string(),
        };
        let response = self
            .client
            .post(self.endpoint(&["user"]))
            .json(&body)
            .send()
            .await?;
        let response = self.check_response(response).await?;
        let session: UserSession = response.json().await?;

        tracing::info!("Registered session {}", session.session_id);
        Ok(session)
    }

    /// Typeahead city search. Returns the candidate list for `query`.
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CityInfo>, ApiError> {
        tracing::debug!("Searching cities for {:?}", query);

        let response = self
            .client
            .get(self.endpoint(&["city-lookup", "search"]))
            .query(&[("query", query)])
            .send()
            .await?;
        let envelope: Envelope<Vec<CityInfo>> = self.check_response(response).await?.json().await?;
        envelope.into_data()
    }

    /// Full forecast bundle for one city.
    pub async fn get_forecast(&self, city: &str) -> Result<WeatherData, ApiError> {
        tracing::debug!("Fetching forecast for {}", city);

        let response = self
            .client
            .get(self.endpoint(&["weather", city, "forecast"]))
            .send()
            .await?;
        let envelope: Envelope<WeatherData> = self.check_response(response).await?.json().await?;
        envelope.into_data()
    }

    /// Current conditions for every city saved under `session_id`, in one
    /// round trip, keyed by city in server order.
    pub async fn get_multi_forecast(&self, session_id: &str) -> Result<CityConditions, ApiError> {
        tracing::debug!("Fetching multi-city forecast for session");

        let response = self
            .client
            .get(self.endpoint(&["weather", "multi-forecast-for-session"]))
            .query(&[("session-id", session_id)])
            .send()
            .await?;
        let envelope: Envelope<CityConditions> =
            self.check_response(response).await?.json().await?;
        envelope.into_data()
    }

    /// Save `city` under the session's favorites.
    pub async fn add_city(&self, session_id: &str, city: &str) -> Result<UserSession, ApiError> {
        tracing::debug!("Adding {} to session", city);

        let body = UserSession {
            session_id: session_id.to_string(),
            city: city.to_string(),
        };
        let response = self
            .client
            .post(self.endpoint(&["user", "add-city"]))
            .json(&body)
            .send()
            .await?;
        let response = self.check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Remove `city` from the session's favorites.
    pub async fn remove_city(&self, session_id: &str, city: &str) -> Result<(), ApiError> {
        tracing::debug!("Removing {} from session", city);

        let body = UserSession {
            session_id: session_id.to_string(),
            city: city.to_string(),
        };
        let response = self
            .client
            .delete(self.endpoint(&["user", "remove-city"]))
            .json(&body)
            .send()
            .await?;
        let outcome: StatusMessage = self.check_response(response).await?.json().await?;
        if outcome.status == STATUS_SUCCESS {
            Ok(())
        } else {
            Err(ApiError::Failed(outcome.status))
        }
    }

    /// Connectivity probe; true when the API answers with a 2xx.
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let response = self.client.get(self.endpoint(&["health-check"])).send().await?;
        Ok(response.status().is_success())
    }
}
