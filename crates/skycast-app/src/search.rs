//! Debounced city-autocomplete controller.
//!
//! Keystrokes update the visible query immediately; the remote search runs
//! only after a quiet period and only for queries of two characters or
//! more. Every issued search captures a generation number and a
//! cancellation token: superseding it cancels the request, and a late
//! completion whose generation is no longer current is discarded, so the
//! candidate list always corresponds to the most recently issued query.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use skycast_api::{CityInfo, WeatherClient};

use crate::event::AppEvent;
use crate::route::Route;

const DEBOUNCE: Duration = Duration::from_millis(300);
const MIN_QUERY_LEN: usize = 2;

/// Why the dropdown is closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Escape,
    Blur,
}

/// Point-in-time view of the search box state.
#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    pub query: String,
    pub candidates: Vec<CityInfo>,
    pub selection: Option<CityInfo>,
    pub open: bool,
    pub loading: bool,
}

struct Inner {
    query: String,
    candidates: Vec<CityInfo>,
    selection: Option<CityInfo>,
    open: bool,
    loading: bool,
    generation: u64,
    token: CancellationToken,
    debounce_task: Option<JoinHandle<()>>,
}

impl Inner {
    /// Invalidate the pending debounce and any in-flight search.
    fn cancel_searches(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
        self.generation += 1;
        self.token.cancel();
        self.loading = false;
    }
}

#[derive(Clone)]
pub struct SearchController {
    client: WeatherClient,
    session_id: String,
    events: mpsc::UnboundedSender<AppEvent>,
    debounce: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl SearchController {
    pub fn new(
        client: WeatherClient,
        session_id: String,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self::with_debounce(client, session_id, events, DEBOUNCE)
    }

    /// Same controller with a custom quiet period (tests use a short one).
    pub fn with_debounce(
        client: WeatherClient,
        session_id: String,
        events: mpsc::UnboundedSender<AppEvent>,
        debounce: Duration,
    ) -> Self {
        Self {
            client,
            session_id,
            events,
            debounce,
            inner: Arc::new(Mutex::new(Inner {
                query: String::new(),
                candidates: Vec::new(),
                selection: None,
                open: false,
                loading: false,
                generation: 0,
                token: CancellationToken::new(),
                debounce_task: None,
            })),
        }
    }

    /// A keystroke: the visible text updates immediately and any prior pick
    /// is invalidated; the search itself waits out the quiet period.
    pub fn input(&self, text: &str) {
        let mut inner = self.inner.lock();
        inner.query = text.to_string();
        inner.selection = None;
        inner.open = true;

        inner.cancel_searches();

        if text.chars().count() < MIN_QUERY_LEN {
            inner.candidates.clear();
            return;
        }

        let controller = self.clone();
        let query = text.to_string();
        let quiet = self.debounce;
        inner.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            controller.issue(query);
        }));
    }

    /// The clear affordance: empties the text without forgetting the
    /// selection, so closing can restore the picked city's display name.
    pub fn clear_input(&self) {
        let mut inner = self.inner.lock();
        inner.query.clear();
        inner.candidates.clear();
        inner.cancel_searches();
    }

    fn issue(&self, query: String) {
        let (generation, token) = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.token = CancellationToken::new();
            inner.loading = true;
            (inner.generation, inner.token.clone())
        };

        let client = self.client.clone();
        let shared = self.inner.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = client.search_cities(&query) => result,
            };

            let mut inner = shared.lock();
            if inner.generation != generation {
                // A newer search was issued; this completion is stale
                return;
            }
            inner.loading = false;
            match result {
                Ok(cities) => inner.candidates = cities,
                Err(e) => {
                    // Search is advisory: degrade to no candidates
                    tracing::debug!("City search failed: {}", e);
                    inner.candidates.clear();
                }
            }
        });
    }

    /// Confirm a candidate: fix the text to its display name, close the
    /// dropdown, notify the shell, and register the city against the
    /// session's favorites best-effort (a failure never undoes the pick).
    pub fn select(&self, city: &CityInfo) {
        {
            let mut inner = self.inner.lock();
            inner.selection = Some(city.clone());
            inner.query = city.display_name.clone();
            inner.open = false;
            inner.cancel_searches();
        }

        let _ = self.events.send(AppEvent::CitySelected(city.name.clone()));

        let client = self.client.clone();
        let session_id = self.session_id.clone();
        let name = city.name.clone();
        tokio::spawn(async move {
            if let Err(e) = client.add_city(&session_id, &name).await {
                tracing::warn!("Failed to register {} with session: {}", name, e);
            }
        });
    }

    /// Re-seed from externally-owned city state (navigation or a
    /// favorites-driven change). When the field already reflects a live
    /// selection for that city, the display name is kept as-is.
    pub fn sync_city(&self, city: Option<&str>) {
        let mut inner = self.inner.lock();
        if let (Some(city), Some(selection)) = (city, &inner.selection) {
            if selection.name == city {
                return;
            }
        }

        inner.cancel_searches();
        inner.candidates.clear();
        inner.selection = None;
        inner.open = false;
        inner.query = city.unwrap_or_default().to_string();
    }

    /// Route transitions: no city is relevant on the preferences screen;
    /// returning to the weather screen restores the current city.
    pub fn route_changed(&self, route: Route, current_city: Option<&str>) {
        match route {
            Route::Preferences => self.sync_city(None),
            Route::Weather => self.sync_city(current_city),
        }
    }

    /// Close the dropdown. On escape/blur with a selection but cleared
    /// text, the selection's display name is restored.
    pub fn close(&self, reason: CloseReason) {
        let mut inner = self.inner.lock();
        if matches!(reason, CloseReason::Escape | CloseReason::Blur) && inner.query.is_empty() {
            let restored = inner.selection.as_ref().map(|s| s.display_name.clone());
            if let Some(display_name) = restored {
                inner.query = display_name;
            }
        }
        inner.open = false;
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        let inner = self.inner.lock();
        SearchSnapshot {
            query: inner.query.clone(),
            candidates: inner.candidates.clone(),
            selection: inner.selection.clone(),
            open: inner.open,
            loading: inner.loading,
        }
    }
}
