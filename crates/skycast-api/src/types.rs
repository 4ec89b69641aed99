//! Wire types for the remote weather API.
//!
//! All payloads are camelCase JSON; the remote reports outcome through a
//! `status` field where `"SUCCESS"` is the only success value.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::client::ApiError;

/// The only `status` value the remote uses for success.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Generic `{status, data}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, treating any non-success status as a failed
    /// operation regardless of HTTP outcome.
    pub fn into_data(self) -> Result<T, ApiError> {
        match self {
            Envelope {
                status,
                data: Some(data),
            } if status == STATUS_SUCCESS => Ok(data),
            Envelope { status, .. } => Err(ApiError::Failed(status)),
        }
    }
}

/// `{status, message}` response shape used by mutations without a payload.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusMessage {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Session record: also the request body for session mutations and the
/// locally persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub session_id: String,
    pub city: String,
}

/// A city-autocomplete candidate. Identity for display purposes is
/// `display_name`; coordinates are informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityInfo {
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub icon: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub pressure: f64,
    pub sunrise: String,
    pub sunset: String,
}

/// One hourly forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    pub time: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub icon: String,
    pub precipitation_chance: f64,
    pub wind_speed: f64,
}

/// One daily forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub condition: String,
    pub icon: String,
    pub precipitation_chance: f64,
    pub wind_speed: f64,
}

/// Complete forecast bundle for one city; fetched fresh on every request
/// and never merged client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub city: String,
    pub current: CurrentWeather,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

/// Current conditions keyed by city, in the order the server sent them.
///
/// The multi-forecast response is a JSON object; its key order carries the
/// server-side favorites order, so a plain `HashMap` would lose it. Entries
/// are kept as an ordered list instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CityConditions {
    entries: Vec<(String, CurrentWeather)>,
}

impl CityConditions {
    /// City names in server order.
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(city, _)| city.as_str())
    }

    pub fn get(&self, city: &str) -> Option<&CurrentWeather> {
        self.entries
            .iter()
            .find(|(name, _)| name == city)
            .map(|(_, conditions)| conditions)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(String, CurrentWeather)> {
        self.entries
    }
}

impl FromIterator<(String, CurrentWeather)> for CityConditions {
    fn from_iter<I: IntoIterator<Item = (String, CurrentWeather)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for CityConditions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CityConditionsVisitor;

        impl<'de> Visitor<'de> for CityConditionsVisitor {
            type Value = CityConditions;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of city names to current conditions")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, CurrentWeather>()? {
                    entries.push(entry);
                }
                Ok(CityConditions { entries })
            }
        }

        deserializer.deserialize_map(CityConditionsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions_json(temp: f64) -> String {
        format!(
            r#"{{
                "temperature": {temp},
                "feelsLike": {temp},
                "condition": "Clear",
                "icon": "01d",
                "humidity": 40,
                "windSpeed": 3.5,
                "windDirection": "NW",
                "pressure": 1012,
                "sunrise": "06:01",
                "sunset": "18:42"
            }}"#
        )
    }

    #[test]
    fn test_user_session_wire_shape() {
        let session = UserSession {
            session_id: "abc-123".to_string(),
            city: "London".to_string(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(json, r#"{"sessionId":"abc-123","city":"London"}"#);
    }

    #[test]
    fn test_city_info_deserialization() {
        let json = r#"{
            "name": "London",
            "state": "England",
            "country": "UK",
            "latitude": 51.5074,
            "longitude": -0.1278,
            "displayName": "London, UK"
        }"#;
        let city: CityInfo = serde_json::from_str(json).unwrap();
        assert_eq!(city.name, "London");
        assert_eq!(city.display_name, "London, UK");
    }

    #[test]
    fn test_weather_data_deserialization() {
        let json = format!(
            r#"{{
                "city": "London",
                "current": {current},
                "hourly": [{{
                    "time": "2026-08-06T10:00:00Z",
                    "temperature": 19.5,
                    "feelsLike": 19.0,
                    "condition": "Clouds",
                    "icon": "03d",
                    "precipitationChance": 20,
                    "windSpeed": 4.2
                }}],
                "daily": [{{
                    "date": "2026-08-06",
                    "minTemp": 14.0,
                    "maxTemp": 22.0,
                    "condition": "Clouds",
                    "icon": "03d",
                    "precipitationChance": 35,
                    "windSpeed": 5.0
                }}]
            }}"#,
            current = conditions_json(20.0)
        );
        let data: WeatherData = serde_json::from_str(&json).unwrap();
        assert_eq!(data.city, "London");
        assert_eq!(data.hourly.len(), 1);
        assert_eq!(data.daily[0].max_temp, 22.0);
    }

    #[test]
    fn test_envelope_success_yields_data() {
        let json = r#"{"status": "SUCCESS", "data": [1, 2, 3]}"#;
        let envelope: Envelope<Vec<i32>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.into_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_envelope_failure_is_error_even_with_data() {
        let json = r#"{"status": "FAILED", "data": [1]}"#;
        let envelope: Envelope<Vec<i32>> = serde_json::from_str(json).unwrap();
        assert!(envelope.into_data().is_err());
    }

    #[test]
    fn test_envelope_success_without_data_is_error() {
        let json = r#"{"status": "SUCCESS"}"#;
        let envelope: Envelope<Vec<i32>> = serde_json::from_str(json).unwrap();
        assert!(envelope.into_data().is_err());
    }

    #[test]
    fn test_city_conditions_preserve_server_order() {
        let json = format!(
            r#"{{"Paris": {a}, "Tokyo": {b}, "Lima": {c}}}"#,
            a = conditions_json(18.0),
            b = conditions_json(27.0),
            c = conditions_json(15.0)
        );
        let conditions: CityConditions = serde_json::from_str(&json).unwrap();
        let cities: Vec<&str> = conditions.cities().collect();
        assert_eq!(cities, vec!["Paris", "Tokyo", "Lima"]);
        assert_eq!(conditions.get("Tokyo").unwrap().temperature, 27.0);
        assert!(conditions.get("Berlin").is_none());
    }
}
