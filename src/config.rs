use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use log::debug;
use time::format_description::BorrowedFormatItem;
use time::macros::{format_description, offset};
use time::{Duration, UtcOffset};
use url::Url;

use crate::error::ConfigError;
use crate::resample::BUCKET;
use crate::sensor::feed::DATE_PLACEHOLDER;
use crate::units::UnitSystem;

const DEFAULT_SENSOR_FEED_URL: &str = "https://a.atmos.washington.edu/cgi-bin/uw.cgi?{date}";
const DEFAULT_WEATHER_API_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
const DEFAULT_FORECAST_API_URL: &str = "http://api.openweathermap.org/data/2.5/forecast";
const MINUTES_PER_DAY: i64 = 24 * 60;
/// Clock of the rooftop station, Pacific daylight time
const DEFAULT_FEED_UTC_OFFSET: UtcOffset = offset!(-7);
const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub sensor_feed_url: String,
    pub feed_utc_offset: UtcOffset,
    pub weather_api_url: Url,
    pub forecast_api_url: Url,
    pub city: String,
    pub forecast_units: UnitSystem,
    pub bucket: Duration,
    pub lookback_days: u32,
    pub http_timeout: std::time::Duration,
    pub fetch_concurrency: usize,
    pub skip_failed_days: bool,
    pub refresh_interval: std::time::Duration,
    pub snapshot_path: PathBuf,
    pub run_once: bool,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key-value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENWEATHER_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing("OPENWEATHER_API_KEY"))?;

        let bucket_minutes: i64 = parse_or(&lookup, "BUCKET_MINUTES", BUCKET.whole_minutes())?;
        if bucket_minutes <= 0 || MINUTES_PER_DAY % bucket_minutes != 0 {
            return Err(ConfigError::Invalid {
                key: "BUCKET_MINUTES",
                value: bucket_minutes.to_string(),
                reason: "must be a positive divisor of 1440".to_string(),
            });
        }

        let fetch_concurrency: usize = parse_or(&lookup, "FETCH_CONCURRENCY", 1)?;
        if fetch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "FETCH_CONCURRENCY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let config = Config {
            api_key,
            sensor_feed_url: feed_template_or(&lookup, DEFAULT_SENSOR_FEED_URL)?,
            feed_utc_offset: offset_or(&lookup, "FEED_UTC_OFFSET", DEFAULT_FEED_UTC_OFFSET)?,
            weather_api_url: url_or(&lookup, "WEATHER_API_URL", DEFAULT_WEATHER_API_URL)?,
            forecast_api_url: url_or(&lookup, "FORECAST_API_URL", DEFAULT_FORECAST_API_URL)?,
            city: lookup("WEATHER_CITY").unwrap_or_else(|| "Seattle".to_string()),
            forecast_units: parse_or(&lookup, "FORECAST_UNITS", UnitSystem::Imperial)?,
            bucket: Duration::minutes(bucket_minutes),
            lookback_days: parse_or(&lookup, "LOOKBACK_DAYS", 7)?,
            http_timeout: std::time::Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?),
            fetch_concurrency,
            skip_failed_days: parse_or(&lookup, "SKIP_FAILED_DAYS", false)?,
            refresh_interval: std::time::Duration::from_secs(parse_or(
                &lookup,
                "REFRESH_INTERVAL_SECS",
                24 * 60 * 60,
            )?),
            snapshot_path: lookup("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("weather_snapshot.json")),
            run_once: parse_or(&lookup, "RUN_ONCE", false)?,
        };

        debug!(
            "Loaded configuration: city={}, units={}, bucket={} min, lookback={} days",
            config.city,
            config.forecast_units.as_query(),
            bucket_minutes,
            config.lookback_days
        );

        Ok(config)
    }

    /// Shared HTTP client carrying the per-request timeout
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("rooftop-wx-etl/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}

fn url_or<F>(lookup: &F, key: &'static str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    let parsed = Url::parse(&value);
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

/// The feed locator must be a valid URL once a date is filled in
fn feed_template_or<F>(lookup: &F, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let key = "SENSOR_FEED_URL";
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    let sample = if value.contains(DATE_PLACEHOLDER) {
        value.replace(DATE_PLACEHOLDER, "20240101")
    } else {
        format!("{}20240101", value)
    };
    match Url::parse(&sample) {
        Ok(_) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

/// UTC offset written as `-07:00`
fn offset_or<F>(lookup: &F, key: &'static str, default: UtcOffset) -> Result<UtcOffset, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    let parsed = UtcOffset::parse(value.trim(), OFFSET_FORMAT);
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
