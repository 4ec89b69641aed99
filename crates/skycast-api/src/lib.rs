//! Typed client for the remote weather/geocoding API.
//!
//! The client is stateless: each operation issues one HTTP call and returns
//! typed data or an [`ApiError`]. Retry policy belongs to callers.

pub mod client;
pub mod types;

pub use client::{ApiError, WeatherClient};
pub use types::{
    CityConditions, CityInfo, CurrentWeather, DailyForecast, Envelope, HourlyForecast,
    StatusMessage, UserSession, WeatherData, STATUS_SUCCESS,
};
