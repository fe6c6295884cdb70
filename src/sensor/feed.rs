/// Fetching the rooftop sensor feed, one daily resource at a time
use futures_util::stream::{self, Stream, StreamExt, TryStreamExt};
use log::{debug, info, warn};
use time::Date;

use crate::config::Config;
use crate::error::FeedError;
use crate::models::RawObservation;
use crate::sensor::parser::parse_daily_feed;
use crate::utils::{dates_between, format_feed_date};

/// Placeholder replaced by `YYYYMMDD` in the resource locator template
pub const DATE_PLACEHOLDER: &str = "{date}";

#[derive(Debug, Clone)]
pub struct SensorFeed {
    client: reqwest::Client,
    url_template: String,
    concurrency: usize,
    skip_failed_days: bool,
}

impl SensorFeed {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            url_template: config.sensor_feed_url.clone(),
            concurrency: config.fetch_concurrency.max(1),
            skip_failed_days: config.skip_failed_days,
        }
    }

    /// Resource locator for one day of observations
    pub fn resource_url(&self, date: Date) -> String {
        let date = format_feed_date(date);
        if self.url_template.contains(DATE_PLACEHOLDER) {
            self.url_template.replace(DATE_PLACEHOLDER, &date)
        } else {
            format!("{}{}", self.url_template, date)
        }
    }

    /// Fetch and fully parse one daily resource
    ///
    /// A record that fails to parse fails the whole day, so a day is either
    /// returned complete or not at all.
    pub async fn fetch_day(&self, date: Date) -> Result<Vec<RawObservation>, FeedError> {
        let url = self.resource_url(date);
        debug!("Fetching sensor feed for {} from {}", date, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FeedError::Http { date, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                date,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FeedError::Http { date, source })?;

        let mut records = parse_daily_feed(date, &body);
        let observations = records.by_ref().collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Parsed {} observations for {} ({} lines skipped)",
            observations.len(),
            date,
            records.skipped()
        );
        Ok(observations)
    }

    /// Lazy sequence of observations from `start` through `end`, inclusive
    ///
    /// Days are fetched as the stream is polled, at most `concurrency` at a
    /// time, and yielded in date order. A failed day ends the sequence with
    /// its error unless the feed was configured to skip failed days.
    pub fn observations(
        &self,
        start: Date,
        end: Date,
    ) -> Result<impl Stream<Item = Result<RawObservation, FeedError>> + '_, FeedError> {
        let dates = dates_between(start, end)?;
        info!(
            "Loading sensor feed for {} days ({} to {})",
            dates.len(),
            start,
            end
        );

        let stream = stream::iter(dates)
            .map(move |date| self.fetch_day(date))
            .buffered(self.concurrency)
            .filter_map(move |day| async move {
                match day {
                    Err(e) if self.skip_failed_days => {
                        warn!("Skipping sensor feed day: {}", e);
                        None
                    }
                    other => Some(other),
                }
            })
            .flat_map(|day| {
                let items: Vec<Result<RawObservation, FeedError>> = match day {
                    Ok(observations) => observations.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            });

        Ok(stream)
    }

    /// Collect the whole range, stopping at the first error
    pub async fn load(&self, start: Date, end: Date) -> Result<Vec<RawObservation>, FeedError> {
        self.observations(start, end)?.try_collect().await
    }
}
