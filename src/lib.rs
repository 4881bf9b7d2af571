//! # Tide Dashboard Core Library
//!
//! This library renders a weather-and-tide status image for a fixed-layout
//! 800x480 e-paper display, pulling data from two upstream services:
//!
//! - **OpenWeather One Call 3.0**: current conditions plus the multi-day
//!   forecast, in a single GET per render cycle
//! - **NOAA CO-OPS**: the trailing 24 hours of water-level measurements
//!   (MLLW datum) and the high/low tide predictions for today and tomorrow
//!
//! ## Data Flow
//!
//! 1. **Fetch**: bounded-backoff HTTP GETs ([`fetch`]) through the typed
//!    provider clients ([`weather`], [`tide`])
//! 2. **Normalize**: raw provider records into the value objects below
//!    ([`forecast`])
//! 3. **Plot**: the water-level series into a filled-area chart
//!    ([`tide_plot`])
//! 4. **Compose**: everything onto the 800x480 canvas ([`layout`])
//! 5. **Display**: hand the finished buffer to the display target
//!    ([`display`]), either real e-paper hardware or a PNG preview
//!
//! Every entity is created fresh each render cycle and discarded once the
//! image has been written; nothing is cached across cycles.
//!
//! ## Degradation
//!
//! When a fetch stage fails after its internal retries, the cycle
//! short-circuits and the caller draws a full-screen error panel instead,
//! re-running the whole cycle after a fixed delay. Missing assets (template,
//! icons) abort the process: they indicate a packaging defect, not a
//! transient condition.

use chrono::NaiveDateTime;

// Module declarations
pub mod assets;
pub mod canvas;
pub mod config;
pub mod cycle;
pub mod display;
pub mod epd7in5_v2;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod layout;
pub mod tide;
pub mod tide_plot;
pub mod weather;

/// Current weather conditions, extracted once per render cycle from the
/// One Call `current` block.
#[derive(Clone, Debug)]
pub struct CurrentConditions {
    /// Air temperature in the configured units
    pub temp: f32,
    /// Apparent ("feels like") temperature
    pub feels_like: f32,
    /// Relative humidity, percent
    pub humidity: u8,
    /// Wind speed (MPH for imperial units)
    pub wind_speed: f32,
    /// Textual description, e.g. "light rain"
    pub description: String,
    /// Provider icon code, e.g. "10d"
    pub icon_code: String,
}

/// One day of normalized forecast data.
///
/// Produced by [`forecast::normalize`] from a raw One Call `daily` record.
/// The precipitation probability is always a percentage (the provider's
/// 0..1 fraction times 100), and the `fmt_*` strings are the exact text the
/// compositor draws, rounded to the nearest integer.
#[derive(Clone, Debug)]
pub struct DailyForecast {
    /// Minimum temperature for the day
    pub temp_min: f32,
    /// Maximum temperature for the day
    pub temp_max: f32,
    /// Precipitation probability, 0-100
    pub precip_percent: f32,
    /// Provider icon code, e.g. "04d"
    pub icon_code: String,
    /// Display string, e.g. "Low: 54°F"
    pub fmt_temp_min: String,
    /// Display string, e.g. "High: 72°F"
    pub fmt_temp_max: String,
    /// Display string, e.g. "Precip: 30%"
    pub fmt_precip: String,
    /// Icon asset filename, e.g. "04d.png"
    pub icon_file: String,
}

/// A single water-level measurement relative to the station datum (MLLW).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSample {
    /// Measurement time in the station's local time zone
    pub time: NaiveDateTime,
    /// Water level in feet above MLLW (may be negative)
    pub level_ft: f32,
}

/// Ordered water-level series spanning the trailing 24 hours.
#[derive(Clone, Debug, Default)]
pub struct WaterLevelSeries {
    pub samples: Vec<LevelSample>,
}

impl WaterLevelSeries {
    /// Maximum level in the series; `NEG_INFINITY` for an empty series.
    pub fn max_level(&self) -> f32 {
        self.samples
            .iter()
            .map(|s| s.level_ft)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Return a copy of the series shifted so its minimum value is zero.
    ///
    /// Stations report levels relative to MLLW, which can dip negative at
    /// extreme low tide. The plotted shape is relative, not absolute to the
    /// datum, so every value is shifted up by the series minimum. Relative
    /// deltas are preserved exactly: `rebased[i] = raw[i] - min(raw)`.
    pub fn rebased(&self) -> WaterLevelSeries {
        if self.samples.is_empty() {
            return WaterLevelSeries::default();
        }
        let min = self
            .samples
            .iter()
            .map(|s| s.level_ft)
            .fold(f32::INFINITY, f32::min);
        WaterLevelSeries {
            samples: self
                .samples
                .iter()
                .map(|s| LevelSample {
                    time: s.time,
                    level_ft: s.level_ft - min,
                })
                .collect(),
        }
    }
}

/// Whether a tide extremum is a high or a low water event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TideKind {
    High,
    Low,
}

/// One predicted tide extremum (high or low water).
///
/// Well-formed tide data alternates High/Low chronologically; that is
/// expected but not enforced. A record whose kind field is neither "H" nor
/// "L" carries `kind: None` and is skipped silently by the compositor.
#[derive(Clone, Debug)]
pub struct TideExtremum {
    /// Event time in the station's local time zone
    pub time: NaiveDateTime,
    /// High, Low, or None for an unlabeled record
    pub kind: Option<TideKind>,
}
