//! # NOAA CO-OPS Tide Client
//!
//! Queries the CO-OPS `datagetter` endpoint for two products against a
//! configured station:
//!
//! - `water_level`: the trailing 24 hours of measured levels, MLLW datum,
//!   station-local time (`lst_ldt`)
//! - `predictions` with `interval=hilo`: the discrete high/low events for
//!   today and tomorrow
//!
//! Both fail with a [`ProviderError`] on malformed or empty responses. The
//! client does not retry beyond the bounded backoff in [`crate::fetch`];
//! cycle-level retry and the error panel are the caller's responsibility.
//!
//! CO-OPS has shipped two spellings for the extremum-kind field in hilo
//! predictions (`type` and `hi_lo`), so the field name is a client-level
//! parameter rather than a hardcoded key.

use crate::config::TideConfig;
use crate::error::{ProviderError, TransportError};
use crate::fetch::{self, RetryPolicy};
use crate::{LevelSample, TideExtremum, TideKind, WaterLevelSeries};
use chrono::{DateTime, Duration, Local, NaiveDateTime};
use reqwest::Url;
use serde::Deserialize;

const DATAGETTER_URL: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";
const PROVIDER: &str = "tide";

/// Timestamp format CO-OPS uses in response bodies
const COOPS_TIME_FMT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Deserialize)]
struct WaterLevelResponse {
    #[serde(default)]
    data: Vec<RawLevel>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    t: String,
    v: String,
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    #[serde(default)]
    predictions: Vec<serde_json::Value>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Typed client for one CO-OPS tide station.
pub struct TideClient {
    client: reqwest::Client,
    policy: RetryPolicy,
    station_id: String,
    hilo_field: String,
}

impl TideClient {
    pub fn new(client: reqwest::Client, policy: RetryPolicy, config: &TideConfig) -> Self {
        TideClient {
            client,
            policy,
            station_id: config.noaa_station_id.clone(),
            hilo_field: config.hilo_field.clone(),
        }
    }

    fn url(&self, params: &[(&str, String)]) -> Url {
        let mut pairs: Vec<(&str, String)> = vec![
            ("station", self.station_id.clone()),
            ("datum", "MLLW".to_string()),
            ("time_zone", "lst_ldt".to_string()),
            ("units", "english".to_string()),
            ("format", "json".to_string()),
            ("application", "tide-dashboard".to_string()),
        ];
        pairs.extend_from_slice(params);
        Url::parse_with_params(DATAGETTER_URL, &pairs).expect("datagetter base URL should be valid")
    }

    async fn get_body(&self, url: Url) -> Result<String, ProviderError> {
        let response = fetch::get_with_retries(&self.client, &url, &self.policy).await?;
        Ok(response.text().await.map_err(TransportError)?)
    }

    /// Measured water levels over [now - 24h, now].
    pub async fn water_level_last_24h(&self) -> Result<WaterLevelSeries, ProviderError> {
        let now: DateTime<Local> = Local::now();
        let yesterday = now - Duration::hours(24);
        let url = self.url(&[
            ("product", "water_level".to_string()),
            ("begin_date", yesterday.format("%Y%m%d %H:%M").to_string()),
            ("end_date", now.format("%Y%m%d %H:%M").to_string()),
        ]);
        eprintln!("Fetching water levels for station {}", self.station_id);
        parse_water_levels(&self.get_body(url).await?)
    }

    /// Predicted high/low events over [today, tomorrow].
    pub async fn tide_extrema(&self) -> Result<Vec<TideExtremum>, ProviderError> {
        let today: DateTime<Local> = Local::now();
        let tomorrow = today + Duration::days(1);
        let url = self.url(&[
            ("product", "predictions".to_string()),
            ("interval", "hilo".to_string()),
            ("begin_date", today.format("%Y%m%d").to_string()),
            ("end_date", tomorrow.format("%Y%m%d").to_string()),
        ]);
        eprintln!("Fetching tide predictions for station {}", self.station_id);
        parse_predictions(&self.get_body(url).await?, &self.hilo_field)
    }
}

/// Parse a `water_level` body into an ordered series.
///
/// CO-OPS occasionally emits rows with blank values during sensor outages;
/// those rows are skipped rather than failing the whole series.
pub fn parse_water_levels(body: &str) -> Result<WaterLevelSeries, ProviderError> {
    let response: WaterLevelResponse = serde_json::from_str(body).map_err(|e| malformed(e))?;
    if let Some(err) = response.error {
        return Err(ProviderError::Rejected {
            provider: PROVIDER,
            message: err.message,
        });
    }

    let mut samples = Vec::with_capacity(response.data.len());
    for row in &response.data {
        let time = match NaiveDateTime::parse_from_str(row.t.trim(), COOPS_TIME_FMT) {
            Ok(t) => t,
            Err(_) => continue,
        };
        let level_ft: f32 = match row.v.trim().parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        samples.push(LevelSample { time, level_ft });
    }

    if samples.is_empty() {
        return Err(ProviderError::Empty { provider: PROVIDER });
    }
    Ok(WaterLevelSeries { samples })
}

/// Parse a hilo `predictions` body, reading the extremum kind from
/// `kind_field` ("type" or "hi_lo" depending on the endpoint variant).
pub fn parse_predictions(body: &str, kind_field: &str) -> Result<Vec<TideExtremum>, ProviderError> {
    let response: PredictionsResponse = serde_json::from_str(body).map_err(|e| malformed(e))?;
    if let Some(err) = response.error {
        return Err(ProviderError::Rejected {
            provider: PROVIDER,
            message: err.message,
        });
    }

    let mut extrema = Vec::with_capacity(response.predictions.len());
    for record in &response.predictions {
        let t = record
            .get("t")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::Malformed {
                provider: PROVIDER,
                detail: "prediction record missing \"t\"".to_string(),
            })?;
        let time =
            NaiveDateTime::parse_from_str(t.trim(), COOPS_TIME_FMT).map_err(|e| malformed(e))?;

        // Kind parsing is deliberately lenient: anything that is not a
        // recognizable H/L marker stays unlabeled and is skipped downstream.
        let kind = record
            .get(kind_field)
            .and_then(|v| v.as_str())
            .and_then(|s| match s.trim().chars().next() {
                Some('H') | Some('h') => Some(TideKind::High),
                Some('L') | Some('l') => Some(TideKind::Low),
                _ => None,
            });
        extrema.push(TideExtremum { time, kind });
    }

    if extrema.is_empty() {
        return Err(ProviderError::Empty { provider: PROVIDER });
    }
    Ok(extrema)
}

fn malformed<E: std::fmt::Display>(e: E) -> ProviderError {
    ProviderError::Malformed {
        provider: PROVIDER,
        detail: e.to_string(),
    }
}
