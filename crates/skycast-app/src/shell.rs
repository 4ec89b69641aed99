//! The orchestrator: composes the persisted session, the current-city
//! cell, routing, and the per-screen controllers.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use skycast_api::{UserSession, WeatherClient, WeatherData};
use skycast_core::{AppError, Config};
use skycast_session::{LocationProvider, PersistentSession, SessionStore};

use crate::current_city::CurrentCity;
use crate::error_map;
use crate::event::AppEvent;
use crate::notice::{Notice, NoticeQueue};
use crate::preferences::PreferencesController;
use crate::route::Route;
use crate::search::SearchController;
use crate::view_state::{Fetcher, ViewState};

pub struct AppShell {
    session: UserSession,
    client: WeatherClient,
    current_city: CurrentCity,
    route: Mutex<Route>,
    weather: Fetcher<WeatherData>,
    search: SearchController,
    preferences: PreferencesController,
    notices: NoticeQueue,
    events: Mutex<mpsc::UnboundedReceiver<AppEvent>>,
}

impl AppShell {
    /// Bootstrap the session and assemble the controllers.
    ///
    /// A failure here is fatal: nothing is rendered except the error, and
    /// the only recovery is calling `initialize` again (the reload action).
    pub async fn initialize<L: LocationProvider>(
        config: &Config,
        locator: L,
    ) -> Result<Self, AppError> {
        let client = WeatherClient::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )
        .map_err(error_map::api_error)?;

        let session = PersistentSession::new(
            SessionStore::new(&config.config_dir),
            client.clone(),
            locator,
            config.location.geocode_url.clone(),
            config.location.default_city.clone(),
        )
        .bootstrap()
        .await
        .map_err(error_map::session_error)?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let notices = NoticeQueue::default();
        let current_city = CurrentCity::new(&session.city);

        let search = SearchController::new(
            client.clone(),
            session.session_id.clone(),
            events_tx.clone(),
        );
        search.sync_city(Some(&session.city));

        let preferences = PreferencesController::new(
            client.clone(),
            session.session_id.clone(),
            events_tx,
            notices.clone(),
        );

        let shell = Self {
            session,
            client,
            current_city,
            route: Mutex::new(Route::Weather),
            weather: Fetcher::new(),
            search,
            preferences,
            notices,
            events: Mutex::new(events_rx),
        };
        shell.refresh_weather();

        tracing::info!("Shell initialized for session {}", shell.session.session_id);
        Ok(shell)
    }

    /// Drain child events. Call after interactions (or on each frame).
    pub fn pump(&self) {
        loop {
            let event = self.events.lock().try_recv();
            match event {
                Ok(AppEvent::CitySelected(city)) => self.select_city(&city),
                Err(_) => break,
            }
        }
    }

    /// Confirmed selection from either controller: commit the city, return
    /// to the weather screen, and refetch for it.
    pub fn select_city(&self, city: &str) {
        self.current_city.commit(city);
        self.set_route(Route::Weather);
        self.refresh_weather();
    }

    pub fn navigate(&self, path: &str) {
        self.set_route(Route::from_path(path));
    }

    /// The top-bar preferences button toggles between the two screens.
    pub fn toggle_preferences(&self) {
        let next = match self.route() {
            Route::Preferences => Route::Weather,
            Route::Weather => Route::Preferences,
        };
        self.set_route(next);
    }

    fn set_route(&self, route: Route) {
        *self.route.lock() = route;
        match route {
            Route::Preferences => {
                self.search.route_changed(Route::Preferences, None);
                self.preferences.load();
            }
            Route::Weather => {
                let city = self.current_city.read();
                self.search.route_changed(Route::Weather, Some(&city));
            }
        }
    }

    fn refresh_weather(&self) {
        let client = self.client.clone();
        let city = self.current_city.read();
        self.weather.run(move || {
            let client = client.clone();
            let city = city.clone();
            async move {
                client
                    .get_forecast(&city)
                    .await
                    .map_err(error_map::api_error)
            }
        });
    }

    /// Re-issue the last forecast fetch (same city).
    pub fn retry_weather(&self) {
        self.weather.retry();
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn current_city(&self) -> String {
        self.current_city.read()
    }

    pub fn route(&self) -> Route {
        *self.route.lock()
    }

    pub fn weather_state(&self) -> ViewState<WeatherData> {
        self.weather.state()
    }

    /// Last fetched forecast; kept during refreshes so the weather screen
    /// can show "updating" instead of a blank first-load state.
    pub fn last_weather(&self) -> Option<WeatherData> {
        self.weather.latest_data()
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn preferences(&self) -> &PreferencesController {
        &self.preferences
    }

    /// Pending transient notifications, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.notices.drain()
    }
}
