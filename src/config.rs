//! # Configuration Management
//!
//! Loads runtime configuration from `tide-dashboard.toml`: the display
//! location, the OpenWeather and NOAA provider settings, fetch retry
//! parameters, and the display/refresh options. The configuration is read
//! once at process start and passed by reference into every component
//! constructor; there is no ambient global lookup.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Application configuration loaded from tide-dashboard.toml
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Human-readable location label drawn on the dashboard
    pub location_name: String,
    /// Route display output to a PNG preview instead of hardware
    pub dry_run: bool,
    /// OpenWeather One Call settings
    pub weather: WeatherConfig,
    /// NOAA CO-OPS tide station settings
    pub tides: TideConfig,
    /// HTTP retry settings
    pub fetch: FetchConfig,
    /// Refresh cadence and dry-run preview options
    pub display: DisplayConfig,
    /// Template and icon locations
    pub assets: AssetConfig,
}

/// OpenWeather One Call 3.0 settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeather API key (required for live fetches)
    pub openweather_api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    /// "imperial" for Fahrenheit/MPH, "metric" for Celsius/m/s
    pub units: String,
}

/// NOAA CO-OPS tide station settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TideConfig {
    /// NOAA station ID (e.g. "8418150" for Portland, ME)
    pub noaa_station_id: String,
    /// JSON field carrying the extremum kind in hilo predictions.
    /// CO-OPS has shipped both "type" and "hi_lo" spellings.
    pub hilo_field: String,
}

/// HTTP retry settings for the bounded-backoff fetcher
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per GET before the last error propagates
    pub retries: u32,
    /// Base backoff in milliseconds; attempt n sleeps backoff * 2^n
    pub backoff_ms: u64,
}

/// Refresh cadence and dry-run preview options
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Minutes between successful render cycles
    pub refresh_minutes: u64,
    /// Seconds to wait before re-running a failed cycle
    pub error_retry_secs: u64,
    /// Where the dry-run display writes its PNG preview
    pub preview_path: String,
    /// GPIO/SPI wiring for the physical panel
    pub hardware: HardwareConfig,
}

/// GPIO pin numbers (BCM) and SPI device for the panel
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub spi_device: String,
    pub dc_pin: u32,
    pub rst_pin: u32,
    pub busy_pin: u32,
}

/// Template and icon locations
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding template.png and icon/<code>.png
    pub dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location_name: "Portland, ME".to_string(),
            dry_run: false,
            weather: WeatherConfig::default(),
            tides: TideConfig::default(),
            fetch: FetchConfig::default(),
            display: DisplayConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            openweather_api_key: String::new(),
            latitude: 43.6591,
            longitude: -70.2553,
            units: "imperial".to_string(),
        }
    }
}

impl Default for TideConfig {
    fn default() -> Self {
        TideConfig {
            noaa_station_id: "8418150".to_string(),
            hilo_field: "type".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            retries: 3,
            backoff_ms: 300,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            refresh_minutes: 15,
            error_retry_secs: 30,
            preview_path: "tide-preview.png".to_string(),
            hardware: HardwareConfig::default(),
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        // Standard Waveshare e-Paper HAT wiring
        HardwareConfig {
            spi_device: "/dev/spidev0.0".to_string(),
            dc_pin: 25,
            rst_pin: 17,
            busy_pin: 24,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        AssetConfig {
            dir: "images".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from tide-dashboard.toml in the working directory.
    /// Falls back to default configuration if the file is missing or invalid.
    pub fn load() -> Self {
        Self::load_from_path("tide-dashboard.toml")
    }

    /// Load configuration from the given path, defaulting on any failure.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    println!("Loaded configuration for: {}", config.location_name);
                    config
                }
                Err(e) => {
                    eprintln!("Warning: Invalid config file format: {}", e);
                    eprintln!("Using default configuration (Portland, ME)");
                    Self::default()
                }
            },
            Err(_) => {
                eprintln!("Info: No config file found, using default configuration (Portland, ME)");
                Self::default()
            }
        }
    }

    /// Delay between failed cycles.
    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_secs(self.display.error_retry_secs)
    }

    /// Delay between successful cycles.
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.display.refresh_minutes * 60)
    }
}
