//! Anonymous session lifecycle: the persisted session record, the
//! geolocation-to-city collaborator, and first-run bootstrap.

pub mod bootstrap;
pub mod geolocate;
pub mod store;

pub use bootstrap::{PersistentSession, SessionError};
pub use geolocate::{resolve_city, reverse_geocode, Coordinates, LocationProvider, SystemLocator};
pub use store::SessionStore;
