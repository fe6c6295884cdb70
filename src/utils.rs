/// Utility functions for date handling and display formatting
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::FeedError;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day].[month].[year] - [hour]:[minute]:[second]");
const DISPLAY_DATE: &[BorrowedFormatItem<'static>] = format_description!("[month]/[day]/[year]");
const DISPLAY_CLOCK: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
const DISPLAY_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[month]/[day]/[year] [hour]:[minute]");
const ISO_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const FEED_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]");

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_timestamp(dt: &OffsetDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).unwrap_or_else(|_| dt.to_string())
}

/// `MM/DD/YYYY`
pub fn format_date(date: Date) -> String {
    date.format(DISPLAY_DATE).unwrap_or_else(|_| date.to_string())
}

/// `HH:MM`
pub fn format_clock(time: Time) -> String {
    time.format(DISPLAY_CLOCK).unwrap_or_else(|_| time.to_string())
}

/// `MM/DD/YYYY HH:MM`
pub fn format_display_datetime(dt: PrimitiveDateTime) -> String {
    dt.format(DISPLAY_DATETIME).unwrap_or_else(|_| dt.to_string())
}

/// `YYYY-MM-DD HH:MM:SS`, the form used for observation times in records
pub fn format_iso_datetime(dt: PrimitiveDateTime) -> String {
    dt.format(ISO_DATETIME).unwrap_or_else(|_| dt.to_string())
}

pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// `YYYYMMDD`, as substituted into the sensor resource locator
pub fn format_feed_date(date: Date) -> String {
    date.format(FEED_DATE).unwrap_or_else(|_| date.to_string())
}

pub fn parse_iso_datetime(text: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(text, ISO_DATETIME).ok()
}

/// Convert a time::Duration to seconds as u64
///
/// Helper function to work with interval calculations in the main loop.
pub fn duration_to_seconds(duration: Duration) -> u64 {
    duration.whole_seconds().max(0) as u64
}

/// Every calendar date from `start` to `end`, both inclusive
pub fn dates_between(start: Date, end: Date) -> Result<Vec<Date>, FeedError> {
    if start > end {
        return Err(FeedError::InvalidRange { start, end });
    }
    let mut dates = Vec::new();
    let mut current = Some(start);
    while let Some(date) = current {
        if date > end {
            break;
        }
        dates.push(date);
        current = date.next_day();
    }
    Ok(dates)
}

/// The default sensor window: `lookback_days` before `today` through `today`
pub fn lookback_window(today: Date, lookback_days: u32) -> (Date, Date) {
    let start = today
        .checked_sub(Duration::days(i64::from(lookback_days)))
        .unwrap_or(Date::MIN);
    (start, today)
}

/// Round to the nearest integer, ties to even
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn dates_between_is_inclusive() {
        let dates = dates_between(date!(2024 - 02 - 27), date!(2024 - 03 - 01)).unwrap();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 27),
                date!(2024 - 02 - 28),
                date!(2024 - 02 - 29),
                date!(2024 - 03 - 01),
            ]
        );
        assert_eq!(
            dates_between(date!(2024 - 03 - 01), date!(2024 - 03 - 01)).unwrap(),
            vec![date!(2024 - 03 - 01)]
        );
    }

    #[test]
    fn dates_between_rejects_reversed_range() {
        let err = dates_between(date!(2024 - 03 - 02), date!(2024 - 03 - 01)).unwrap_err();
        assert!(matches!(err, FeedError::InvalidRange { .. }));
    }

    #[test]
    fn default_window_spans_eight_days() {
        let (start, end) = lookback_window(date!(2024 - 05 - 08), 7);
        assert_eq!(start, date!(2024 - 05 - 01));
        assert_eq!(dates_between(start, end).unwrap().len(), 8);
    }

    #[test]
    fn rounding_ties_to_even() {
        assert_eq!(round_half_even(72.5), 72);
        assert_eq!(round_half_even(73.5), 74);
        assert_eq!(round_half_even(4.49), 4);
        assert_eq!(round_half_even(-2.5), -2);
    }

    #[test]
    fn display_formats() {
        let dt = datetime!(2024-05-01 09:05:00);
        assert_eq!(format_display_datetime(dt), "05/01/2024 09:05");
        assert_eq!(format_date(dt.date()), "05/01/2024");
        assert_eq!(format_clock(dt.time()), "09:05");
        assert_eq!(format_feed_date(dt.date()), "20240501");
        assert_eq!(format_iso_datetime(dt), "2024-05-01 09:05:00");
        assert_eq!(parse_iso_datetime("2024-05-01 09:05:00"), Some(dt));
        assert_eq!(parse_iso_datetime("05/01/2024"), None);
    }
}
