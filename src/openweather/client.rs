/// HTTP access to the OpenWeather current-weather and forecast endpoints
use log::debug;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::ApiError;
use crate::openweather::current::Coordinates;
use crate::units::UnitSystem;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    weather_url: Url,
    forecast_url: Url,
    units: UnitSystem,
}

impl OpenWeatherClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            weather_url: config.weather_api_url.clone(),
            forecast_url: config.forecast_api_url.clone(),
            units: config.forecast_units,
        }
    }

    /// Current conditions are always requested in imperial units
    pub fn current_url(&self, city: &str) -> Url {
        let mut url = self.weather_url.clone();
        url.query_pairs_mut()
            .append_pair("q", city)
            .append_pair("units", "Imperial")
            .append_pair("appid", &self.api_key);
        url
    }

    pub fn forecast_url(&self, at: Coordinates) -> Url {
        let mut url = self.forecast_url.clone();
        url.query_pairs_mut()
            .append_pair("lat", &at.lat.to_string())
            .append_pair("lon", &at.lon.to_string())
            .append_pair("units", self.units.as_query())
            .append_pair("appid", &self.api_key);
        url
    }

    pub async fn current_weather(&self, city: &str) -> Result<Value, ApiError> {
        self.get_json(self.current_url(city)).await
    }

    /// 5-day / 3-hour forecast at the given coordinates
    pub async fn forecast(&self, at: Coordinates) -> Result<Value, ApiError> {
        self.get_json(self.forecast_url(at)).await
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        // The query carries the API key, so only the endpoint is logged
        debug!("Requesting {}{}", url.host_str().unwrap_or_default(), url.path());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::Network)?;
        check_status(response.status())?;

        let body = response.bytes().await.map_err(ApiError::Network)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

/// Map a non-success status to its error
pub fn check_status(status: StatusCode) -> Result<(), ApiError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        other => Err(ApiError::Status(other.as_u16())),
    }
}
