/// Flattening of the 5-day / 3-hour forecast payload into rows
use serde_json::Value;

use crate::error::ApiError;
use crate::models::ForecastRow;
use crate::openweather::json::{array, number, optional_number, text};
use crate::utils::{parse_iso_datetime, round_half_even};

/// Flatten every `list` entry into a [`ForecastRow`], keeping payload order.
///
/// Any missing key fails the whole payload; no partial rows are returned.
/// Temperature, wind speed and gust are rounded half-to-even, everything
/// else passes through.
pub fn normalize_forecast(payload: &Value) -> Result<Vec<ForecastRow>, ApiError> {
    array(payload, "list")?
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            forecast_row(entry).map_err(|e| e.within(&format!("list.{}", index)))
        })
        .collect()
}

fn forecast_row(entry: &Value) -> Result<ForecastRow, ApiError> {
    let stamp = text(entry, "dt_txt")?;
    let time = parse_iso_datetime(&stamp).ok_or_else(|| ApiError::InvalidField {
        path: "dt_txt".to_string(),
        expected: "a YYYY-MM-DD HH:MM:SS timestamp",
    })?;

    Ok(ForecastRow {
        time,
        temperature: round_half_even(number(entry, "main.temp")?),
        temperature_min: number(entry, "main.temp_min")?,
        temperature_max: number(entry, "main.temp_max")?,
        pressure: number(entry, "main.pressure")?,
        humidity: number(entry, "main.humidity")?,
        conditions: text(entry, "weather.0.main")?,
        description: text(entry, "weather.0.description")?,
        cloud_cover: number(entry, "clouds.all")?,
        wind_speed: round_half_even(number(entry, "wind.speed")?),
        wind_direction: number(entry, "wind.deg")?,
        // Calm periods come without a gust reading
        wind_gust: optional_number(entry, "wind.gust")?.map(round_half_even),
        pop: number(entry, "pop")?,
    })
}
