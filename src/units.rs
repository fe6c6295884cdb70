/// Parameter identifiers and their display units
///
/// Every numeric column produced by the resampler or the forecast normalizer
/// is one of the `Parameter` variants below, so labels and units are looked up
/// structurally instead of by free-form strings.
use std::fmt;
use std::str::FromStr;

use crate::error::UnitError;

/// How raw readings of a parameter are combined inside a resampling bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Arithmetic mean of every reading
    Mean,
    /// Arithmetic mean, treating readings of exactly zero as sensor faults
    MeanExcludingZero,
}

impl Aggregation {
    /// Whether a reading takes part in the bucket average
    pub fn accepts(self, value: f64) -> bool {
        match self {
            Aggregation::Mean => true,
            Aggregation::MeanExcludingZero => value != 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub unit: &'static str,
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Parameter {
    RelativeHumidity,
    Temperature,
    WindDirection,
    WindSpeed,
    Gust,
    Rain,
    Radiation,
    Pressure,
    TemperatureMin,
    TemperatureMax,
    CloudCover,
    Pop,
}

impl Parameter {
    /// Sensor feed columns, in the order they appear after the time field
    pub const OBSERVED: [Parameter; 8] = [
        Parameter::RelativeHumidity,
        Parameter::Temperature,
        Parameter::WindDirection,
        Parameter::WindSpeed,
        Parameter::Gust,
        Parameter::Rain,
        Parameter::Radiation,
        Parameter::Pressure,
    ];

    /// Numeric forecast columns
    pub const FORECAST: [Parameter; 10] = [
        Parameter::Temperature,
        Parameter::TemperatureMin,
        Parameter::TemperatureMax,
        Parameter::Pressure,
        Parameter::RelativeHumidity,
        Parameter::CloudCover,
        Parameter::WindSpeed,
        Parameter::WindDirection,
        Parameter::Gust,
        Parameter::Pop,
    ];

    pub const ALL: [Parameter; 12] = [
        Parameter::RelativeHumidity,
        Parameter::Temperature,
        Parameter::WindDirection,
        Parameter::WindSpeed,
        Parameter::Gust,
        Parameter::Rain,
        Parameter::Radiation,
        Parameter::Pressure,
        Parameter::TemperatureMin,
        Parameter::TemperatureMax,
        Parameter::CloudCover,
        Parameter::Pop,
    ];

    pub const fn info(self) -> ParameterInfo {
        use Aggregation::*;
        let (name, unit, aggregation) = match self {
            Parameter::RelativeHumidity => ("Relative Humidity", "%", Mean),
            Parameter::Temperature => ("Temperature", "\u{b0}F", MeanExcludingZero),
            Parameter::WindDirection => ("Wind Direction", "\u{b0}", Mean),
            Parameter::WindSpeed => ("Wind Speed", "kts", Mean),
            Parameter::Gust => ("Gust", "kts", Mean),
            Parameter::Rain => ("Rain", "in.", Mean),
            Parameter::Radiation => ("Radiation", "W/m^2", Mean),
            Parameter::Pressure => ("Pressure", "hPa", Mean),
            Parameter::TemperatureMin => ("Temperature Min", "\u{b0}F", Mean),
            Parameter::TemperatureMax => ("Temperature Max", "\u{b0}F", Mean),
            Parameter::CloudCover => ("Cloud Cover", "%", Mean),
            Parameter::Pop => ("Pop", "0-1", Mean),
        };
        ParameterInfo {
            name,
            unit,
            aggregation,
        }
    }

    /// Display name, also used as the column key in presentation records
    pub const fn name(self) -> &'static str {
        self.info().name
    }

    pub fn from_name(name: &str) -> Option<Parameter> {
        Parameter::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit system requested from the forecast API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn as_query(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
        }
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" => Ok(UnitSystem::Imperial),
            "metric" => Ok(UnitSystem::Metric),
            other => Err(format!("expected imperial or metric, got '{}'", other)),
        }
    }
}

/// Parameter name to unit lookup for labels
///
/// Sensor observations always use the feed's own units. Forecast temperatures
/// and speeds follow the unit system the forecast was requested in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitRegistry {
    forecast_units: UnitSystem,
}

impl UnitRegistry {
    pub fn new(forecast_units: UnitSystem) -> Self {
        Self { forecast_units }
    }

    pub fn observation_unit(&self, parameter: Parameter) -> &'static str {
        parameter.info().unit
    }

    pub fn forecast_unit(&self, parameter: Parameter) -> &'static str {
        match (parameter, self.forecast_units) {
            (
                Parameter::Temperature | Parameter::TemperatureMin | Parameter::TemperatureMax,
                UnitSystem::Imperial,
            ) => "\u{b0}F",
            (
                Parameter::Temperature | Parameter::TemperatureMin | Parameter::TemperatureMax,
                UnitSystem::Metric,
            ) => "\u{b0}C",
            (Parameter::WindSpeed | Parameter::Gust, UnitSystem::Imperial) => "mph",
            (Parameter::WindSpeed | Parameter::Gust, UnitSystem::Metric) => "m/s",
            _ => parameter.info().unit,
        }
    }

    /// Look up an observation unit by display name.
    ///
    /// Unknown names are an error rather than an empty unit, since every
    /// produced column must be labelled.
    pub fn lookup(&self, name: &str) -> Result<&'static str, UnitError> {
        Parameter::from_name(name)
            .map(|p| self.observation_unit(p))
            .ok_or_else(|| UnitError::UnknownParameter(name.to_string()))
    }

    /// Axis label such as `Temperature (°F)`
    pub fn label(&self, parameter: Parameter) -> String {
        format!("{} ({})", parameter.name(), self.observation_unit(parameter))
    }

    pub fn forecast_label(&self, parameter: Parameter) -> String {
        format!("{} ({})", parameter.name(), self.forecast_unit(parameter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_produced_parameter_has_a_unit() {
        let registry = UnitRegistry::default();
        for parameter in Parameter::OBSERVED.iter().chain(Parameter::FORECAST.iter()) {
            let unit = registry.lookup(parameter.name()).unwrap();
            assert!(!unit.is_empty(), "{} has no unit", parameter);
            assert!(!registry.forecast_unit(*parameter).is_empty());
        }
    }

    #[test]
    fn unknown_parameter_fails_loudly() {
        let registry = UnitRegistry::default();
        match registry.lookup("Dew Point") {
            Err(UnitError::UnknownParameter(name)) => assert_eq!(name, "Dew Point"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn sensor_units_match_feed() {
        let registry = UnitRegistry::default();
        assert_eq!(registry.lookup("Temperature").unwrap(), "°F");
        assert_eq!(registry.lookup("Wind Speed").unwrap(), "kts");
        assert_eq!(registry.lookup("Radiation").unwrap(), "W/m^2");
        assert_eq!(registry.label(Parameter::Pressure), "Pressure (hPa)");
    }

    #[test]
    fn forecast_units_follow_unit_system() {
        let imperial = UnitRegistry::new(UnitSystem::Imperial);
        let metric = UnitRegistry::new(UnitSystem::Metric);
        assert_eq!(imperial.forecast_unit(Parameter::WindSpeed), "mph");
        assert_eq!(metric.forecast_unit(Parameter::WindSpeed), "m/s");
        assert_eq!(metric.forecast_label(Parameter::TemperatureMax), "Temperature Max (°C)");
        assert_eq!(metric.forecast_unit(Parameter::Pop), "0-1");
    }

    #[test]
    fn only_temperature_excludes_zero_readings() {
        for parameter in Parameter::ALL {
            let expected = if parameter == Parameter::Temperature {
                Aggregation::MeanExcludingZero
            } else {
                Aggregation::Mean
            };
            assert_eq!(parameter.info().aggregation, expected);
        }
        assert!(!Aggregation::MeanExcludingZero.accepts(0.0));
        assert!(Aggregation::MeanExcludingZero.accepts(-0.5));
    }

    #[test]
    fn names_round_trip() {
        for parameter in Parameter::ALL {
            assert_eq!(Parameter::from_name(parameter.name()), Some(parameter));
        }
        assert_eq!("Metric".parse::<UnitSystem>(), Ok(UnitSystem::Metric));
        assert!("kelvin".parse::<UnitSystem>().is_err());
    }
}
