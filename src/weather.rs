//! # OpenWeather One Call Client
//!
//! Fetches current conditions and the multi-day forecast in a single GET to
//! the One Call 3.0 endpoint, then parses the response into typed structs.
//! Parsing fails fast with a descriptive [`ProviderError`] when an expected
//! key is missing, so the compositor never sees the raw provider schema.
//!
//! The client itself does not retry beyond the bounded backoff inside
//! [`crate::fetch`]; cycle-level retry/fallback policy belongs to the caller.

use crate::config::WeatherConfig;
use crate::error::{ProviderError, TransportError};
use crate::fetch::{self, RetryPolicy};
use crate::{CurrentConditions, DailyForecast};
use reqwest::Url;
use serde::Deserialize;

const ONECALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";
const PROVIDER: &str = "weather";

/// Parsed One Call 3.0 response, `minutely`/`hourly` excluded at the query.
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub current: RawCurrent,
    pub daily: Vec<RawDaily>,
}

/// Raw `current` block.
#[derive(Debug, Deserialize)]
pub struct RawCurrent {
    pub temp: f32,
    pub feels_like: f32,
    pub humidity: u8,
    pub wind_speed: f32,
    pub weather: Vec<RawWeather>,
}

/// Raw per-day forecast record.
#[derive(Debug, Deserialize)]
pub struct RawDaily {
    pub temp: RawDailyTemp,
    /// Precipitation probability as a 0..1 fraction
    pub pop: f32,
    pub weather: Vec<RawWeather>,
}

#[derive(Debug, Deserialize)]
pub struct RawDailyTemp {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Deserialize)]
pub struct RawWeather {
    pub description: String,
    pub icon: String,
}

impl CurrentConditions {
    /// Extract the current-conditions snapshot from a One Call response.
    pub fn from_one_call(response: &OneCallResponse) -> Result<Self, ProviderError> {
        let weather = response
            .current
            .weather
            .first()
            .ok_or(ProviderError::Malformed {
                provider: PROVIDER,
                detail: "current.weather is empty".to_string(),
            })?;
        Ok(CurrentConditions {
            temp: response.current.temp,
            feels_like: response.current.feels_like,
            humidity: response.current.humidity,
            wind_speed: response.current.wind_speed,
            description: weather.description.clone(),
            icon_code: weather.icon.clone(),
        })
    }
}

/// Typed client for the One Call 3.0 endpoint.
pub struct WeatherClient {
    client: reqwest::Client,
    policy: RetryPolicy,
    api_key: String,
    latitude: f64,
    longitude: f64,
    units: String,
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, policy: RetryPolicy, config: &WeatherConfig) -> Self {
        WeatherClient {
            client,
            policy,
            api_key: config.openweather_api_key.clone(),
            latitude: config.latitude,
            longitude: config.longitude,
            units: config.units.clone(),
        }
    }

    fn url(&self) -> Url {
        Url::parse_with_params(
            ONECALL_URL,
            &[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("units", self.units.clone()),
                ("exclude", "minutely,hourly".to_string()),
                ("appid", self.api_key.clone()),
            ],
        )
        .expect("One Call base URL should be valid")
    }

    /// Single GET for current conditions and the daily forecast.
    pub async fn one_call(&self) -> Result<OneCallResponse, ProviderError> {
        let url = self.url();
        eprintln!("Fetching weather from OpenWeather One Call");
        let response = fetch::get_with_retries(&self.client, &url, &self.policy).await?;
        let body = response.text().await.map_err(TransportError)?;
        parse_one_call(&body)
    }

    /// Current-conditions snapshot (one GET).
    pub async fn current_conditions(&self) -> Result<CurrentConditions, ProviderError> {
        CurrentConditions::from_one_call(&self.one_call().await?)
    }

    /// First `days` normalized daily forecasts (one GET).
    pub async fn forecast(&self, days: usize) -> Result<Vec<DailyForecast>, ProviderError> {
        crate::forecast::normalize_days(&self.one_call().await?.daily, days)
    }
}

/// Parse a One Call body, mapping missing keys to a descriptive error.
pub fn parse_one_call(body: &str) -> Result<OneCallResponse, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
        provider: PROVIDER,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned response matching the shape the dashboard consumes.
    pub(crate) const CANNED_ONECALL: &str = r#"{
        "current": {
            "dt": 1718550000,
            "temp": 68.4,
            "feels_like": 65.0,
            "humidity": 71,
            "wind_speed": 5.3,
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]
        },
        "daily": [
            {"temp": {"min": 54.2, "max": 71.6}, "pop": 0.42,
             "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]},
            {"temp": {"min": 50.0, "max": 68.0}, "pop": 0.1,
             "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}]},
            {"temp": {"min": 48.9, "max": 66.1}, "pop": 1.0,
             "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d"}]}
        ]
    }"#;

    #[test]
    fn parses_canned_one_call() {
        let parsed = parse_one_call(CANNED_ONECALL).unwrap();
        assert!((parsed.current.temp - 68.4).abs() < 1e-6);
        assert!((parsed.current.feels_like - 65.0).abs() < 1e-6);
        assert_eq!(parsed.current.humidity, 71);
        assert_eq!(parsed.daily.len(), 3);
        assert_eq!(parsed.daily[2].weather[0].icon, "04d");
    }

    #[test]
    fn extracts_current_conditions() {
        let parsed = parse_one_call(CANNED_ONECALL).unwrap();
        let current = CurrentConditions::from_one_call(&parsed).unwrap();
        assert_eq!(current.description, "light rain");
        assert_eq!(current.icon_code, "10d");
        assert!((current.wind_speed - 5.3).abs() < 1e-6);
    }

    #[test]
    fn missing_current_key_is_malformed() {
        let err = parse_one_call(r#"{"daily": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { provider, .. } if provider == "weather"));
    }

    #[test]
    fn empty_weather_array_is_malformed() {
        let body = r#"{
            "current": {"temp": 60.0, "feels_like": 58.0, "humidity": 50,
                        "wind_speed": 2.0, "weather": []},
            "daily": []
        }"#;
        let parsed = parse_one_call(body).unwrap();
        assert!(CurrentConditions::from_one_call(&parsed).is_err());
    }
}
