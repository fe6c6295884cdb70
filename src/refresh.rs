/// One refresh cycle: sensor observations, current conditions and forecast
use log::{info, warn};
use time::OffsetDateTime;

use crate::config::Config;
use crate::error::{FeedError, RefreshError};
use crate::models::{CurrentConditionsSummary, ForecastRow, ResampledObservation};
use crate::openweather::{coordinates, current_conditions, normalize_forecast, OpenWeatherClient};
use crate::resample::resample;
use crate::sensor::SensorFeed;
use crate::snapshot::Snapshot;
use crate::units::UnitRegistry;
use crate::utils::lookback_window;

pub struct Pipeline {
    config: Config,
    feed: SensorFeed,
    weather: OpenWeatherClient,
    units: UnitRegistry,
}

impl Pipeline {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let client = config.http_client()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        Self {
            feed: SensorFeed::new(client.clone(), &config),
            weather: OpenWeatherClient::new(client, &config),
            units: UnitRegistry::new(config.forecast_units),
            config,
        }
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Rebuild every dataset from scratch
    ///
    /// Both branches run concurrently; if either fails the whole cycle fails
    /// and nothing from it is returned.
    pub async fn refresh(&self, now: OffsetDateTime) -> Result<Snapshot, RefreshError> {
        // Feed dates follow the station's clock, not UTC
        let today = now.to_offset(self.config.feed_utc_offset).date();
        let (start, end) = lookback_window(today, self.config.lookback_days);

        let (observations, weather) =
            tokio::join!(self.load_observations(start, end), self.load_weather());
        let observations = observations?;
        let (current, forecast) = weather?;

        Ok(Snapshot {
            generated_at: now,
            observations,
            forecast,
            current,
        })
    }

    /// Sensor feed for the window, averaged onto the bucket grid
    pub async fn load_observations(
        &self,
        start: time::Date,
        end: time::Date,
    ) -> Result<Vec<ResampledObservation>, FeedError> {
        let raw = self.feed.load(start, end).await?;
        let raw_count = raw.len();
        let resampled = resample(raw, self.config.bucket);

        let missing = resampled.iter().filter(|r| r.temperature.is_none()).count();
        if missing > 0 {
            warn!("{} buckets have no valid temperature reading", missing);
        }
        info!(
            "Resampled {} observations into {} rows",
            raw_count,
            resampled.len()
        );
        Ok(resampled)
    }

    /// Current conditions for the configured city, then the forecast there
    pub async fn load_weather(
        &self,
    ) -> Result<(CurrentConditionsSummary, Vec<ForecastRow>), RefreshError> {
        let payload = self
            .weather
            .current_weather(&self.config.city)
            .await
            .map_err(RefreshError::Current)?;
        let current = current_conditions(&payload).map_err(RefreshError::Current)?;
        let at = coordinates(&payload).map_err(RefreshError::Current)?;

        let forecast_payload = self
            .weather
            .forecast(at)
            .await
            .map_err(RefreshError::Forecast)?;
        let forecast = normalize_forecast(&forecast_payload).map_err(RefreshError::Forecast)?;

        info!(
            "Loaded current conditions and {} forecast steps for {}",
            forecast.len(),
            self.config.city
        );
        Ok((current, forecast))
    }
}
