/// Aligning raw sensor observations onto a fixed time grid
use std::collections::BTreeMap;

use time::{Duration, PrimitiveDateTime};

use crate::models::{RawObservation, ResampledObservation};
use crate::units::Parameter;

/// Default bucket width
pub const BUCKET: Duration = Duration::minutes(30);

const SECONDS_PER_DAY: i64 = 86_400;

/// Running sum for one parameter within one bucket
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Debug, Default)]
struct Bucket {
    values: [Accumulator; Parameter::OBSERVED.len()],
    samples: usize,
}

impl Bucket {
    fn push(&mut self, observation: &RawObservation) {
        self.samples += 1;
        for (slot, parameter) in self.values.iter_mut().zip(Parameter::OBSERVED) {
            let Some(value) = observation.value(parameter) else {
                continue;
            };
            // Zero temperatures are sensor faults, not readings
            if parameter.info().aggregation.accepts(value) {
                slot.sum += value;
                slot.count += 1;
            }
        }
    }

    fn mean(&self, parameter: Parameter) -> Option<f64> {
        Parameter::OBSERVED
            .iter()
            .position(|p| *p == parameter)
            .and_then(|index| self.values[index].mean())
    }

    fn finish(&self, time: PrimitiveDateTime) -> ResampledObservation {
        ResampledObservation {
            time,
            date: time.date(),
            relative_humidity: self.mean(Parameter::RelativeHumidity),
            temperature: self.mean(Parameter::Temperature),
            wind_direction: self.mean(Parameter::WindDirection),
            wind_speed: self.mean(Parameter::WindSpeed),
            gust: self.mean(Parameter::Gust),
            rain: self.mean(Parameter::Rain),
            radiation: self.mean(Parameter::Radiation),
            pressure: self.mean(Parameter::Pressure),
            samples: self.samples,
        }
    }
}

/// Start of the wall-clock bucket containing `time`.
///
/// Buckets are aligned to midnight, so `width` must divide a day evenly.
pub fn bucket_start(time: PrimitiveDateTime, width: Duration) -> PrimitiveDateTime {
    let width = width.whole_seconds().clamp(1, SECONDS_PER_DAY);
    let (hour, minute, second) = time.as_hms();
    let elapsed = i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second);
    time.date().midnight() + Duration::seconds(elapsed - elapsed % width)
}

/// Average observations into buckets of `width`
///
/// Empty buckets produce no row. Output is in ascending time order whatever
/// the input order.
pub fn resample<I>(observations: I, width: Duration) -> Vec<ResampledObservation>
where
    I: IntoIterator<Item = RawObservation>,
{
    let mut buckets: BTreeMap<PrimitiveDateTime, Bucket> = BTreeMap::new();

    for observation in observations {
        buckets
            .entry(bucket_start(observation.time, width))
            .or_default()
            .push(&observation);
    }

    buckets
        .iter()
        .map(|(start, bucket)| bucket.finish(*start))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::{date, datetime};
    use time::{Date, Time};

    fn observation(time: PrimitiveDateTime, temperature: i32) -> RawObservation {
        RawObservation {
            time,
            relative_humidity: 50,
            temperature,
            wind_direction: 90,
            wind_speed: 4,
            gust: 6,
            rain: 0.01,
            radiation: 100.0,
            pressure: 1012.0,
        }
    }

    #[test]
    fn bucket_boundaries() {
        let width = BUCKET;
        let start = datetime!(2024-05-01 10:00:00);
        assert_eq!(bucket_start(datetime!(2024-05-01 10:07:00), width), start);
        assert_eq!(bucket_start(datetime!(2024-05-01 10:29:59), width), start);
        assert_eq!(
            bucket_start(datetime!(2024-05-01 10:30:00), width),
            datetime!(2024-05-01 10:30:00)
        );
        assert_eq!(
            bucket_start(datetime!(2024-05-01 23:59:59), width),
            datetime!(2024-05-01 23:30:00)
        );
    }

    #[test]
    fn averages_fields_within_bucket() {
        let mut second = observation(datetime!(2024-05-01 10:20:00), 70);
        second.wind_speed = 8;
        second.pressure = 1014.0;
        let rows = resample(
            vec![observation(datetime!(2024-05-01 10:05:00), 66), second],
            BUCKET,
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.time, datetime!(2024-05-01 10:00:00));
        assert_eq!(row.date, date!(2024 - 05 - 01));
        assert_eq!(row.temperature, Some(68.0));
        assert_eq!(row.wind_speed, Some(6.0));
        assert_eq!(row.pressure, Some(1013.0));
        assert_eq!(row.samples, 2);
    }

    #[test]
    fn zero_temperatures_are_missing_not_averaged() {
        let rows = resample(
            vec![
                observation(datetime!(2024-05-01 10:00:00), 0),
                observation(datetime!(2024-05-01 10:10:00), 60),
                observation(datetime!(2024-05-01 10:40:00), 0),
                observation(datetime!(2024-05-01 10:50:00), 0),
            ],
            BUCKET,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temperature, Some(60.0));
        assert_eq!(rows[1].temperature, None);
        // Other parameters of the faulty bucket are still averaged
        assert_eq!(rows[1].relative_humidity, Some(50.0));
        assert_eq!(rows[1].samples, 2);
    }

    #[test]
    fn empty_buckets_produce_no_rows() {
        let rows = resample(
            vec![
                observation(datetime!(2024-05-01 08:00:00), 50),
                observation(datetime!(2024-05-01 11:45:00), 55),
            ],
            BUCKET,
        );
        let times: Vec<_> = rows.iter().map(|r| r.time).collect();
        assert_eq!(
            times,
            vec![datetime!(2024-05-01 08:00:00), datetime!(2024-05-01 11:30:00)]
        );
    }

    #[test]
    fn output_is_sorted_and_dated_across_midnight() {
        let rows = resample(
            vec![
                observation(datetime!(2024-05-02 00:10:00), 51),
                observation(datetime!(2024-05-01 23:50:00), 52),
            ],
            BUCKET,
        );
        assert_eq!(rows[0].time, datetime!(2024-05-01 23:30:00));
        assert_eq!(rows[0].date, date!(2024 - 05 - 01));
        assert_eq!(rows[1].time, datetime!(2024-05-02 00:00:00));
        assert_eq!(rows[1].date, date!(2024 - 05 - 02));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(resample(Vec::new(), BUCKET).is_empty());
    }

    fn arb_observation() -> impl Strategy<Value = RawObservation> {
        (0u32..2 * 86_400, -5i32..100, 0i32..100, 0.0f64..2.0).prop_map(
            |(offset, temperature, humidity, rain)| {
                let day = Date::from_calendar_date(2024, time::Month::May, 1).unwrap();
                let time = PrimitiveDateTime::new(day, Time::MIDNIGHT)
                    + Duration::seconds(i64::from(offset));
                RawObservation {
                    relative_humidity: humidity,
                    rain,
                    ..observation(time, temperature)
                }
            },
        )
    }

    proptest! {
        #[test]
        fn resampling_is_idempotent(observations in prop::collection::vec(arb_observation(), 0..200)) {
            let first = resample(observations.clone(), BUCKET);
            let second = resample(observations, BUCKET);
            prop_assert_eq!(format!("{:?}", first), format!("{:?}", second));
        }

        #[test]
        fn rows_are_ordered_and_inside_their_bucket(observations in prop::collection::vec(arb_observation(), 1..200)) {
            let rows = resample(observations.clone(), BUCKET);
            prop_assert!(rows.windows(2).all(|w| w[0].time < w[1].time));
            prop_assert_eq!(rows.iter().map(|r| r.samples).sum::<usize>(), observations.len());
            for row in &rows {
                prop_assert_eq!(bucket_start(row.time, BUCKET), row.time);
                prop_assert_eq!(row.date, row.time.date());
            }
        }

        #[test]
        fn zero_temperatures_never_pull_the_mean(observations in prop::collection::vec(arb_observation(), 1..200)) {
            for row in resample(observations.clone(), BUCKET) {
                let readings: Vec<f64> = observations
                    .iter()
                    .filter(|o| bucket_start(o.time, BUCKET) == row.time && o.temperature != 0)
                    .map(|o| f64::from(o.temperature))
                    .collect();
                if readings.is_empty() {
                    prop_assert_eq!(row.temperature, None);
                } else {
                    let mean = readings.iter().sum::<f64>() / readings.len() as f64;
                    let got = row.temperature.unwrap();
                    prop_assert!((got - mean).abs() < 1e-9);
                }
            }
        }
    }
}
