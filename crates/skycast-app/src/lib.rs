//! Orchestration layer for the Skycast client: the session-aware app
//! shell, debounced city search, per-screen fetch state machines, and the
//! favorite-cities controller.
//!
//! Rendering is not a concern of this crate; every type here exposes plain
//! state snapshots for whatever front end consumes them.

pub mod current_city;
pub mod error_map;
pub mod event;
pub mod notice;
pub mod preferences;
pub mod route;
pub mod search;
pub mod shell;
pub mod view_state;

pub use current_city::CurrentCity;
pub use event::AppEvent;
pub use notice::{Notice, NoticeQueue, Severity};
pub use preferences::{Favorites, PreferencesController};
pub use route::Route;
pub use search::{CloseReason, SearchController, SearchSnapshot};
pub use shell::AppShell;
pub use view_state::{Fetcher, ViewState};
