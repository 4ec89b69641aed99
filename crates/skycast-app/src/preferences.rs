//! Favorite-cities controller for the preferences screen.
//!
//! The favorites list and its weather snapshots come from one round trip;
//! the key set of the weather map IS the favorites set, in server order.
//! Removal is applied to client state only after server confirmation, so
//! a failed removal needs no rollback: state is simply left untouched
//! and a single error notice is emitted.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use skycast_api::{CityConditions, CurrentWeather, WeatherClient};

use crate::error_map;
use crate::event::AppEvent;
use crate::notice::{Notice, NoticeQueue};
use crate::view_state::{Fetcher, ViewState};

/// Ordered favorites plus a per-city weather side-map, both derived from a
/// single multi-forecast response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Favorites {
    cities: Vec<String>,
    weather: HashMap<String, CurrentWeather>,
}

impl Favorites {
    /// City names in server order.
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn weather_for(&self, city: &str) -> Option<&CurrentWeather> {
        self.weather.get(city)
    }

    pub fn remove(&mut self, city: &str) {
        self.cities.retain(|c| c != city);
        self.weather.remove(city);
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl From<CityConditions> for Favorites {
    fn from(conditions: CityConditions) -> Self {
        let entries = conditions.into_entries();
        let cities = entries.iter().map(|(city, _)| city.clone()).collect();
        let weather = entries.into_iter().collect();
        Self { cities, weather }
    }
}

#[derive(Clone)]
pub struct PreferencesController {
    client: WeatherClient,
    session_id: String,
    events: mpsc::UnboundedSender<AppEvent>,
    notices: NoticeQueue,
    favorites: Fetcher<Favorites>,
    /// Cities with a removal in flight; at most one per city.
    deleting: Arc<Mutex<HashSet<String>>>,
}

impl PreferencesController {
    pub fn new(
        client: WeatherClient,
        session_id: String,
        events: mpsc::UnboundedSender<AppEvent>,
        notices: NoticeQueue,
    ) -> Self {
        Self {
            client,
            session_id,
            events,
            notices,
            favorites: Fetcher::new(),
            deleting: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Fetch the favorites list with a weather snapshot per city, in one
    /// round trip.
    pub fn load(&self) {
        let client = self.client.clone();
        let session_id = self.session_id.clone();
        self.favorites.run(move || {
            let client = client.clone();
            let session_id = session_id.clone();
            async move {
                client
                    .get_multi_forecast(&session_id)
                    .await
                    .map(Favorites::from)
                    .map_err(error_map::api_error)
            }
        });
    }

    pub fn retry(&self) {
        self.favorites.retry();
    }

    pub fn state(&self) -> ViewState<Favorites> {
        self.favorites.state()
    }

    /// True while a removal for `city` is in flight; only that city's
    /// delete action is disabled.
    pub fn is_deleting(&self, city: &str) -> bool {
        self.deleting.lock().contains(city)
    }

    /// Remove `city` from the favorites. A second request for the same
    /// city while one is pending is ignored; other cities are independent.
    pub fn remove(&self, city: &str) {
        {
            let mut deleting = self.deleting.lock();
            if !deleting.insert(city.to_string()) {
                tracing::debug!("Removal already in flight for {}", city);
                return;
            }
        }

        let controller = self.clone();
        let city = city.to_string();
        tokio::spawn(async move {
            match controller
                .client
                .remove_city(&controller.session_id, &city)
                .await
            {
                Ok(()) => {
                    controller.favorites.modify(|favorites| favorites.remove(&city));
                    controller
                        .notices
                        .push(Notice::success(format!("{} removed from saved cities", city)));
                }
                Err(e) => {
                    tracing::warn!("Failed to remove {}: {}", city, e);
                    controller.notices.push(Notice::error(format!(
                        "Could not remove {}. Please try again.",
                        city
                    )));
                }
            }
            controller.deleting.lock().remove(&city);
        });
    }

    /// Selecting a favorite routes back to the weather screen through the
    /// same path as an autocomplete selection.
    pub fn select(&self, city: &str) {
        let _ = self.events.send(AppEvent::CitySelected(city.to_string()));
    }
}
