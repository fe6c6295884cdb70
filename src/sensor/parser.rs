/// Decoding of the line-oriented daily sensor feed
///
/// A daily resource looks like:
///
/// ```text
/// <free-form header lines>
///     TIME  RH  TEMP  DIR  SPD  GUST  RAIN  RAD  PRES
///       ...  %    F   deg  knot knot   in  W/m2  mb     <- units header
/// --------------------------------------------------   <- separator
/// 00:00:00  87   48   190    3    5  0.00   0.0 1018.3
/// ```
///
/// Lines with any field count other than nine are dropped silently. A line
/// with nine fields that do not parse fails the whole day. A page without the
/// units header (no data published for that date) has no records.
use std::iter::Enumerate;
use std::str::{FromStr, Lines};

use log::warn;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use crate::error::FeedError;
use crate::models::RawObservation;
use crate::units::Parameter;

/// Token identifying the units header row
pub const UNITS_MARKER: &str = "knot";

const FIELD_COUNT: usize = 9;
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour padding:none]:[minute]:[second]");

/// Iterator over the data records of one daily resource
#[derive(Debug)]
pub struct DailyRecords<'a> {
    date: Date,
    lines: Enumerate<Lines<'a>>,
    skipped: usize,
}

impl DailyRecords<'_> {
    /// Number of data lines dropped for having the wrong field count so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for DailyRecords<'_> {
    type Item = Result<RawObservation, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            match parse_record(self.date, index + 1, line) {
                Some(record) => return Some(record),
                None => self.skipped += 1,
            }
        }
        None
    }
}

/// Skip the header of a daily resource and return an iterator over its records
///
/// Everything up to and including the first line containing [`UNITS_MARKER`]
/// is header, and the line after it is a separator. Without a marker line the
/// whole body is header and the day yields nothing.
pub fn parse_daily_feed(date: Date, body: &str) -> DailyRecords<'_> {
    let mut lines = body.lines().enumerate();
    let header = lines.by_ref().find(|(_, line)| line.contains(UNITS_MARKER));
    if header.is_none() {
        warn!("Sensor feed for {} has no units header, no records", date);
    }
    lines.next();

    DailyRecords {
        date,
        lines,
        skipped: 0,
    }
}

/// Parse one candidate line. `None` means the line is not a record.
pub fn parse_record(
    date: Date,
    line_number: usize,
    line: &str,
) -> Option<Result<RawObservation, FeedError>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }
    Some(decode_fields(date, line_number, &fields))
}

fn decode_fields(
    date: Date,
    line: usize,
    fields: &[&str],
) -> Result<RawObservation, FeedError> {
    let time = Time::parse(fields[0], TIME_FORMAT).map_err(|_| FeedError::InvalidTime {
        date,
        line,
        value: fields[0].to_string(),
    })?;

    // Remaining columns follow Parameter::OBSERVED order
    let column = |index: usize| (Parameter::OBSERVED[index], fields[index + 1]);

    Ok(RawObservation {
        time: PrimitiveDateTime::new(date, time),
        relative_humidity: parse_number(date, line, column(0))?,
        temperature: parse_number(date, line, column(1))?,
        wind_direction: parse_number(date, line, column(2))?,
        wind_speed: parse_number(date, line, column(3))?,
        gust: parse_number(date, line, column(4))?,
        rain: parse_number(date, line, column(5))?,
        radiation: parse_number(date, line, column(6))?,
        pressure: parse_number(date, line, column(7))?,
    })
}

fn parse_number<T: FromStr>(
    date: Date,
    line: usize,
    (parameter, value): (Parameter, &str),
) -> Result<T, FeedError> {
    value.parse().map_err(|_| FeedError::InvalidField {
        date,
        line,
        field: parameter.name(),
        value: value.to_string(),
    })
}
