use serde_json::{Map, Value};
use time::{Date, PrimitiveDateTime, Time};

use crate::units::Parameter;
use crate::utils::{
    format_clock, format_date, format_display_datetime, format_iso_date, format_iso_datetime,
};

/// Flat row handed to the presentation layer, keyed by column name
pub type Record = Map<String, Value>;

/// One decoded line of the daily sensor feed
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub time: PrimitiveDateTime,
    pub relative_humidity: i32,
    pub temperature: i32,
    pub wind_direction: i32,
    pub wind_speed: i32,
    pub gust: i32,
    pub rain: f64,
    pub radiation: f64,
    pub pressure: f64,
}

impl RawObservation {
    /// Reading for a sensor parameter, `None` for forecast-only parameters
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::RelativeHumidity => Some(f64::from(self.relative_humidity)),
            Parameter::Temperature => Some(f64::from(self.temperature)),
            Parameter::WindDirection => Some(f64::from(self.wind_direction)),
            Parameter::WindSpeed => Some(f64::from(self.wind_speed)),
            Parameter::Gust => Some(f64::from(self.gust)),
            Parameter::Rain => Some(self.rain),
            Parameter::Radiation => Some(self.radiation),
            Parameter::Pressure => Some(self.pressure),
            Parameter::TemperatureMin
            | Parameter::TemperatureMax
            | Parameter::CloudCover
            | Parameter::Pop => None,
        }
    }
}

/// Bucket average of raw observations
///
/// A value is `None` when every reading in the bucket was rejected by the
/// parameter's aggregation rule (zero temperatures).
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledObservation {
    pub time: PrimitiveDateTime,
    pub date: Date,
    pub relative_humidity: Option<f64>,
    pub temperature: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub gust: Option<f64>,
    pub rain: Option<f64>,
    pub radiation: Option<f64>,
    pub pressure: Option<f64>,
    pub samples: usize,
}

impl ResampledObservation {
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::RelativeHumidity => self.relative_humidity,
            Parameter::Temperature => self.temperature,
            Parameter::WindDirection => self.wind_direction,
            Parameter::WindSpeed => self.wind_speed,
            Parameter::Gust => self.gust,
            Parameter::Rain => self.rain,
            Parameter::Radiation => self.radiation,
            Parameter::Pressure => self.pressure,
            _ => None,
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Map::new();
        record.insert("Time".into(), format_iso_datetime(self.time).into());
        record.insert("Date".into(), format_iso_date(self.date).into());
        for parameter in Parameter::OBSERVED {
            record.insert(parameter.name().into(), optional_number(self.value(parameter)));
        }
        record
    }
}

/// Snapshot of the current conditions at the configured location
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditionsSummary {
    pub sunrise: Time,
    pub sunset: Time,
    pub observed_at: PrimitiveDateTime,
    pub description: String,
    pub temperature: i64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: i64,
    pub wind_direction: f64,
    pub cloud_cover: f64,
}

impl CurrentConditionsSummary {
    pub fn to_record(&self) -> Record {
        let mut record = Map::new();
        record.insert("Sunrise".into(), format_clock(self.sunrise).into());
        record.insert("Sunset".into(), format_clock(self.sunset).into());
        record.insert("Date".into(), format_date(self.observed_at.date()).into());
        record.insert("Time".into(), format_clock(self.observed_at.time()).into());
        record.insert("Weather Description".into(), self.description.clone().into());
        record.insert(Parameter::Temperature.name().into(), self.temperature.into());
        record.insert(Parameter::Pressure.name().into(), number(self.pressure));
        record.insert(Parameter::RelativeHumidity.name().into(), number(self.humidity));
        record.insert(Parameter::WindSpeed.name().into(), self.wind_speed.into());
        record.insert(Parameter::WindDirection.name().into(), number(self.wind_direction));
        record.insert(Parameter::CloudCover.name().into(), number(self.cloud_cover));
        record
    }
}

/// One 3-hour step of the 5-day forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub time: PrimitiveDateTime,
    pub temperature: i64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub conditions: String,
    pub description: String,
    pub cloud_cover: f64,
    pub wind_speed: i64,
    pub wind_direction: f64,
    pub wind_gust: Option<i64>,
    pub pop: f64,
}

impl ForecastRow {
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Temperature => Some(self.temperature as f64),
            Parameter::TemperatureMin => Some(self.temperature_min),
            Parameter::TemperatureMax => Some(self.temperature_max),
            Parameter::Pressure => Some(self.pressure),
            Parameter::RelativeHumidity => Some(self.humidity),
            Parameter::CloudCover => Some(self.cloud_cover),
            Parameter::WindSpeed => Some(self.wind_speed as f64),
            Parameter::WindDirection => Some(self.wind_direction),
            Parameter::Gust => self.wind_gust.map(|g| g as f64),
            Parameter::Pop => Some(self.pop),
            Parameter::Rain | Parameter::Radiation => None,
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Map::new();
        record.insert("Date".into(), format_display_datetime(self.time).into());
        record.insert("Weather".into(), self.conditions.clone().into());
        record.insert("Weather Description".into(), self.description.clone().into());
        for parameter in Parameter::FORECAST {
            let value = match parameter {
                // Rounded columns stay integral in the output
                Parameter::Temperature => Value::from(self.temperature),
                Parameter::WindSpeed => Value::from(self.wind_speed),
                Parameter::Gust => self.wind_gust.map_or(Value::Null, Value::from),
                _ => optional_number(self.value(parameter)),
            };
            record.insert(parameter.name().into(), value);
        }
        record
    }
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn optional_number(value: Option<f64>) -> Value {
    value.map_or(Value::Null, number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    fn resampled() -> ResampledObservation {
        ResampledObservation {
            time: datetime!(2024-05-01 10:00:00),
            date: date!(2024 - 05 - 01),
            relative_humidity: Some(55.0),
            temperature: None,
            wind_direction: Some(180.0),
            wind_speed: Some(5.0),
            gust: Some(7.0),
            rain: Some(0.0),
            radiation: Some(120.5),
            pressure: Some(1013.2),
            samples: 3,
        }
    }

    #[test]
    fn resampled_record_uses_parameter_names() {
        let record = resampled().to_record();
        assert_eq!(record["Time"], "2024-05-01 10:00:00");
        assert_eq!(record["Date"], "2024-05-01");
        assert_eq!(record["Temperature"], Value::Null);
        assert_eq!(record["Relative Humidity"], 55.0);
        assert_eq!(record.len(), 2 + Parameter::OBSERVED.len());
    }

    #[test]
    fn raw_observation_exposes_sensor_parameters_only() {
        let raw = RawObservation {
            time: datetime!(2024-05-01 10:00:00),
            relative_humidity: 55,
            temperature: 68,
            wind_direction: 180,
            wind_speed: 5,
            gust: 7,
            rain: 0.0,
            radiation: 120.5,
            pressure: 1013.2,
        };
        for parameter in Parameter::OBSERVED {
            assert!(raw.value(parameter).is_some());
        }
        assert_eq!(raw.value(Parameter::Pop), None);
    }

    #[test]
    fn forecast_record_keeps_rounded_columns_integral() {
        let row = ForecastRow {
            time: datetime!(2024-05-01 12:00:00),
            temperature: 64,
            temperature_min: 62.6,
            temperature_max: 64.9,
            pressure: 1015.0,
            humidity: 71.0,
            conditions: "Clouds".into(),
            description: "broken clouds".into(),
            cloud_cover: 75.0,
            wind_speed: 9,
            wind_direction: 210.0,
            wind_gust: None,
            pop: 0.2,
        };
        let record = row.to_record();
        assert_eq!(record["Date"], "05/01/2024 12:00");
        assert_eq!(record["Temperature"], Value::from(64));
        assert!(record["Wind Speed"].is_i64());
        assert_eq!(record["Gust"], Value::Null);
        assert_eq!(record["Pop"], 0.2);
        assert_eq!(record["Weather Description"], "broken clouds");
    }

    #[test]
    fn current_record_formats_times() {
        let summary = CurrentConditionsSummary {
            sunrise: time!(05:41),
            sunset: time!(20:37),
            observed_at: datetime!(2024-06-01 14:03:00),
            description: "clear sky".into(),
            temperature: 71,
            pressure: 1017.0,
            humidity: 48.0,
            wind_speed: 8,
            wind_direction: 320.0,
            cloud_cover: 0.0,
        };
        let record = summary.to_record();
        assert_eq!(record["Sunrise"], "05:41");
        assert_eq!(record["Sunset"], "20:37");
        assert_eq!(record["Date"], "06/01/2024");
        assert_eq!(record["Time"], "14:03");
        assert_eq!(record["Wind Direction"], 320.0);
    }
}
