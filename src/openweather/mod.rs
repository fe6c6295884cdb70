pub mod client;
pub mod current;
pub mod forecast;
mod json;

pub use client::OpenWeatherClient;
pub use current::{coordinates, current_conditions, Coordinates};
pub use forecast::normalize_forecast;
