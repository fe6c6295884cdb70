/// Snapshot of one refresh cycle, as handed to the dashboard
use std::io;
use std::path::Path;

use serde::Serialize;
use time::OffsetDateTime;

use crate::models::{CurrentConditionsSummary, ForecastRow, Record, ResampledObservation};
use crate::units::{Parameter, UnitRegistry};

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generated_at: OffsetDateTime,
    pub observations: Vec<ResampledObservation>,
    pub forecast: Vec<ForecastRow>,
    pub current: CurrentConditionsSummary,
}

/// Serialized layout of a snapshot file
#[derive(Debug, Serialize)]
struct SnapshotDocument {
    generated_at: i64,
    observations: Vec<Record>,
    forecast: Vec<Record>,
    current: Record,
    observation_units: Vec<(String, String)>,
    forecast_units: Vec<(String, String)>,
}

impl Snapshot {
    pub fn to_json(&self, units: &UnitRegistry) -> serde_json::Result<String> {
        let document = SnapshotDocument {
            generated_at: self.generated_at.unix_timestamp(),
            observations: self.observations.iter().map(|o| o.to_record()).collect(),
            forecast: self.forecast.iter().map(|f| f.to_record()).collect(),
            current: self.current.to_record(),
            observation_units: Parameter::OBSERVED
                .iter()
                .map(|p| (p.name().to_string(), units.observation_unit(*p).to_string()))
                .collect(),
            forecast_units: Parameter::FORECAST
                .iter()
                .map(|p| (p.name().to_string(), units.forecast_unit(*p).to_string()))
                .collect(),
        };
        serde_json::to_string_pretty(&document)
    }
}

/// Replace the snapshot file at `path` atomically
///
/// The new document is written next to the target and renamed over it, so a
/// reader never sees a partial file and a failed write leaves the previous
/// snapshot in place.
pub async fn write_snapshot(path: &Path, json: &str) -> io::Result<()> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");

    tokio::fs::write(&staging, json).await?;
    tokio::fs::rename(&staging, path).await
}
