/// Current-conditions extraction
use serde_json::Value;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::ApiError;
use crate::models::CurrentConditionsSummary;
use crate::openweather::json::{integer, number, text};
use crate::utils::round_half_even;

/// Location of the current-conditions report, used for the forecast request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

pub fn coordinates(payload: &Value) -> Result<Coordinates, ApiError> {
    Ok(Coordinates {
        lat: number(payload, "coord.lat")?,
        lon: number(payload, "coord.lon")?,
    })
}

/// Build the summary record from a current-conditions payload
///
/// Every field is required. Epoch times are shifted by the payload's
/// `timezone` offset (seconds east of UTC), or left in UTC when it is absent.
pub fn current_conditions(payload: &Value) -> Result<CurrentConditionsSummary, ApiError> {
    let offset = utc_offset(payload)?;
    let local = |path: &str| local_time(payload, path, offset);

    Ok(CurrentConditionsSummary {
        sunrise: local("sys.sunrise")?.time(),
        sunset: local("sys.sunset")?.time(),
        observed_at: local("dt")?,
        description: text(payload, "weather.0.description")?,
        temperature: round_half_even(number(payload, "main.temp")?),
        pressure: number(payload, "main.pressure")?,
        humidity: number(payload, "main.humidity")?,
        wind_speed: round_half_even(number(payload, "wind.speed")?),
        wind_direction: number(payload, "wind.deg")?,
        cloud_cover: number(payload, "clouds.all")?,
    })
}

fn utc_offset(payload: &Value) -> Result<UtcOffset, ApiError> {
    let Some(shift) = payload.get("timezone") else {
        return Ok(UtcOffset::UTC);
    };
    shift
        .as_i64()
        .and_then(|seconds| i32::try_from(seconds).ok())
        .and_then(|seconds| UtcOffset::from_whole_seconds(seconds).ok())
        .ok_or_else(|| ApiError::InvalidField {
            path: "timezone".to_string(),
            expected: "a UTC offset in seconds",
        })
}

fn local_time(payload: &Value, path: &str, offset: UtcOffset) -> Result<PrimitiveDateTime, ApiError> {
    let instant = OffsetDateTime::from_unix_timestamp(integer(payload, path)?)
        .map_err(|_| ApiError::InvalidField {
            path: path.to_string(),
            expected: "a unix timestamp",
        })?
        .to_offset(offset);
    Ok(PrimitiveDateTime::new(instant.date(), instant.time()))
}
