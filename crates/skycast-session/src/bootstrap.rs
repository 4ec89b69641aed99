//! First-run session bootstrap.

use skycast_api::{ApiError, UserSession, WeatherClient};
use uuid::Uuid;

use crate::geolocate::{resolve_city, LocationProvider};
use crate::store::SessionStore;

/// Failures that abort initialization. Both are fatal to the app shell.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session registration failed: {0}")]
    Registration(#[source] ApiError),

    #[error("failed to persist session record: {0}")]
    Store(#[source] anyhow::Error),
}

/// Owns the persisted session record and its creation.
///
/// The record is written at most once per device lifetime, here. Committing
/// a new current city later is an in-memory concern of the shell and
/// deliberately does not rewrite the store: the stored city is the
/// session's origin city.
pub struct PersistentSession<L> {
    store: SessionStore,
    client: WeatherClient,
    locator: L,
    geocode_url: String,
    default_city: String,
}

impl<L: LocationProvider> PersistentSession<L> {
    pub fn new(
        store: SessionStore,
        client: WeatherClient,
        locator: L,
        geocode_url: impl Into<String>,
        default_city: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client,
            locator,
            geocode_url: geocode_url.into(),
            default_city: default_city.into(),
        }
    }

    /// Return the stored session, or create one: resolve a city (default on
    /// any geolocation failure), generate a fresh session id, register it
    /// remotely, then persist.
    ///
    /// A stored record is returned verbatim with no remote validation.
    pub async fn bootstrap(&self) -> Result<UserSession, SessionError> {
        if let Some(session) = self.store.load() {
            tracing::info!("Resuming session {}", session.session_id);
            return Ok(session);
        }

        let city = resolve_city(&self.locator, &self.geocode_url, &self.default_city).await;
        let session_id = Uuid::new_v4().to_string();
        tracing::info!("Creating new session for {}", city);

        let session = self
            .client
            .create_session(&session_id, &city)
            .await
            .map_err(SessionError::Registration)?;

        self.store.save(&session).map_err(SessionError::Store)?;

        Ok(session)
    }
}
