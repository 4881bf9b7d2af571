//! # Forecast Normalizer
//!
//! Pure mapping from a raw One Call daily record to [`DailyForecast`]:
//! precipitation probability converted from a 0..1 fraction to a percentage,
//! temperatures and percentages rounded to the nearest integer for display,
//! and the provider icon code turned into an asset filename.

use crate::error::ProviderError;
use crate::weather::RawDaily;
use crate::DailyForecast;

/// Normalize one raw daily record.
///
/// Fails with a [`ProviderError`] when the record carries no weather entry
/// (the icon code lives in `weather[0]`).
pub fn normalize(raw: &RawDaily) -> Result<DailyForecast, ProviderError> {
    let weather = raw.weather.first().ok_or(ProviderError::Malformed {
        provider: "weather",
        detail: "daily.weather is empty".to_string(),
    })?;
    let precip_percent = raw.pop * 100.0;
    Ok(DailyForecast {
        temp_min: raw.temp.min,
        temp_max: raw.temp.max,
        precip_percent,
        icon_code: weather.icon.clone(),
        fmt_temp_min: format!("Low: {:.0}°F", raw.temp.min),
        fmt_temp_max: format!("High: {:.0}°F", raw.temp.max),
        fmt_precip: format!("Precip: {:.0}%", precip_percent),
        icon_file: format!("{}.png", weather.icon),
    })
}

/// Normalize the first `days` records, failing if fewer are present.
pub fn normalize_days(daily: &[RawDaily], days: usize) -> Result<Vec<DailyForecast>, ProviderError> {
    if daily.len() < days {
        return Err(ProviderError::Malformed {
            provider: "weather",
            detail: format!("expected {} daily entries, got {}", days, daily.len()),
        });
    }
    daily[..days].iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{RawDailyTemp, RawWeather};

    fn raw(min: f32, max: f32, pop: f32, icon: &str) -> RawDaily {
        RawDaily {
            temp: RawDailyTemp { min, max },
            pop,
            weather: vec![RawWeather {
                description: "light rain".to_string(),
                icon: icon.to_string(),
            }],
        }
    }

    #[test]
    fn converts_pop_fraction_to_percent_string() {
        let forecast = normalize(&raw(54.0, 72.0, 0.42, "10d")).unwrap();
        assert_eq!(forecast.fmt_precip, "Precip: 42%");
        assert!((forecast.precip_percent - 42.0).abs() < 1e-3);

        let soaked = normalize(&raw(54.0, 72.0, 1.0, "10d")).unwrap();
        assert_eq!(soaked.fmt_precip, "Precip: 100%");
    }

    #[test]
    fn rounds_temperatures_to_nearest_integer() {
        let forecast = normalize(&raw(54.2, 71.6, 0.3, "02d")).unwrap();
        assert_eq!(forecast.fmt_temp_min, "Low: 54°F");
        assert_eq!(forecast.fmt_temp_max, "High: 72°F");
    }

    #[test]
    fn maps_icon_code_to_asset_filename() {
        let forecast = normalize(&raw(50.0, 60.0, 0.0, "04d")).unwrap();
        assert_eq!(forecast.icon_file, "04d.png");
        assert_eq!(forecast.icon_code, "04d");
    }

    #[test]
    fn record_without_weather_entry_fails() {
        let mut record = raw(50.0, 60.0, 0.0, "04d");
        record.weather.clear();
        assert!(normalize(&record).is_err());
    }

    #[test]
    fn too_few_days_is_malformed() {
        let daily = vec![raw(50.0, 60.0, 0.0, "01d")];
        assert!(normalize_days(&daily, 3).is_err());
        assert_eq!(normalize_days(&daily, 1).unwrap().len(), 1);
    }
}
