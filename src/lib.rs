//! Acquisition and normalization of rooftop sensor and OpenWeather data.
//!
//! The daily sensor feed is parsed into [`models::RawObservation`]s and
//! averaged onto a fixed grid by [`resample::resample`]. Current conditions and
//! the 5-day forecast are flattened by the [`openweather`] module. A
//! [`refresh::Pipeline`] runs both for one refresh cycle.
pub mod config;
pub mod error;
pub mod models;
pub mod openweather;
pub mod refresh;
pub mod resample;
pub mod sensor;
pub mod snapshot;
pub mod units;
pub mod utils;

#[cfg(test)]
mod test_support;
