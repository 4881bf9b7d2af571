//! One refresh cycle: fetch weather and tides, compose the frame.
//!
//! Provider failures are tagged with the stage that produced them so the
//! error panel can name its source. Asset failures are kept separate
//! because a missing template or icon cannot heal on retry; the caller
//! treats those as fatal.

use crate::assets::AssetStore;
use crate::canvas::Canvas;
use crate::config::Config;
use crate::error::{AssetError, ProviderError};
use crate::fetch::RetryPolicy;
use crate::forecast::normalize_days;
use crate::layout::{render_dashboard, DashboardData};
use crate::tide::TideClient;
use crate::weather::WeatherClient;
use crate::{tide_plot, CurrentConditions, TideExtremum, WaterLevelSeries};
use chrono::Local;

/// Upstream fetch stages, in the order a cycle runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Weather,
    TideLevels,
    TidePredictions,
}

impl Stage {
    /// Headline shown on the error panel for a failure in this stage.
    pub fn panel_label(self) -> &'static str {
        match self {
            Stage::Weather => "Weather Data",
            Stage::TideLevels => "Tide Data",
            Stage::TidePredictions => "Tide Prediction",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Weather => "weather",
            Stage::TideLevels => "tide levels",
            Stage::TidePredictions => "tide predictions",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("{stage} fetch failed: {source}")]
    Fetch {
        stage: Stage,
        source: ProviderError,
    },
    #[error(transparent)]
    Asset(#[from] AssetError),
}

impl CycleError {
    fn fetch(stage: Stage) -> impl FnOnce(ProviderError) -> Self {
        move |source| CycleError::Fetch { stage, source }
    }
}

/// Owns the API clients and asset store for repeated runs.
pub struct Cycle {
    location: String,
    weather: WeatherClient,
    tides: TideClient,
    assets: AssetStore,
}

impl Cycle {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let policy = RetryPolicy::from(&config.fetch);
        Self {
            location: config.location_name.clone(),
            weather: WeatherClient::new(client.clone(), policy, &config.weather),
            tides: TideClient::new(client, policy, &config.tides),
            assets: AssetStore::new(&config.assets.dir),
        }
    }

    /// Fetch everything and compose one frame.
    pub async fn run(&self) -> Result<Canvas, CycleError> {
        let one_call = self
            .weather
            .one_call()
            .await
            .map_err(CycleError::fetch(Stage::Weather))?;
        let current = CurrentConditions::from_one_call(&one_call)
            .map_err(CycleError::fetch(Stage::Weather))?;
        let forecasts = normalize_days(&one_call.daily, 3)
            .map_err(CycleError::fetch(Stage::Weather))?;

        let levels = self
            .tides
            .water_level_last_24h()
            .await
            .map_err(CycleError::fetch(Stage::TideLevels))?;
        let extrema = self
            .tides
            .tide_extrema()
            .await
            .map_err(CycleError::fetch(Stage::TidePredictions))?;

        self.compose(current, forecasts, levels, extrema)
    }

    fn compose(
        &self,
        current: CurrentConditions,
        forecasts: Vec<crate::DailyForecast>,
        levels: WaterLevelSeries,
        extrema: Vec<TideExtremum>,
    ) -> Result<Canvas, CycleError> {
        let mut days = forecasts.into_iter();
        let (Some(today), Some(tomorrow), Some(day_after)) =
            (days.next(), days.next(), days.next())
        else {
            return Err(CycleError::fetch(Stage::Weather)(ProviderError::Malformed {
                provider: "weather",
                detail: "daily forecast shorter than three days".to_string(),
            }));
        };

        let data = DashboardData {
            location: self.location.clone(),
            current,
            today,
            tomorrow,
            day_after,
            tide_chart: tide_plot::render(&levels),
            extrema,
            generated_at: Local::now(),
        };
        Ok(render_dashboard(&data, &self.assets)?)
    }
}
