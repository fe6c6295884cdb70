/// Error types for configuration, the sensor feed and the OpenWeather API
use std::fmt;

use thiserror::Error;
use time::Date;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("no unit registered for parameter '{0}'")]
    UnknownParameter(String),
}

/// Failures while fetching or parsing the daily sensor feed
///
/// Malformed data lines never produce an error; they are skipped by the parser.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: Date, end: Date },

    #[error("request for {date} failed: {source}")]
    Http {
        date: Date,
        #[source]
        source: reqwest::Error,
    },

    #[error("feed for {date} returned HTTP {status}")]
    Status { date: Date, status: u16 },

    #[error("feed for {date}, line {line}: invalid time '{value}'")]
    InvalidTime {
        date: Date,
        line: usize,
        value: String,
    },

    #[error("feed for {date}, line {line}: invalid {field} '{value}'")]
    InvalidField {
        date: Date,
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Failures while calling the OpenWeather API or reading its payloads
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("access denied, check the API key")]
    Unauthorized,

    #[error("location not found")]
    NotFound,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("could not read the server response: {0}")]
    MalformedResponse(String),

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("field '{path}' is not {expected}")]
    InvalidField { path: String, expected: &'static str },
}

impl ApiError {
    /// Prefix a field path with the position of the entry it came from
    pub fn within(self, prefix: &str) -> Self {
        match self {
            ApiError::MissingField(path) => ApiError::MissingField(format!("{}.{}", prefix, path)),
            ApiError::InvalidField { path, expected } => ApiError::InvalidField {
                path: format!("{}.{}", prefix, path),
                expected,
            },
            other => other,
        }
    }
}

/// Coarse failure class reported to whoever displays the data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    NotFound,
    Network,
    Upstream,
    MalformedResponse,
    InvalidRequest,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Auth => "auth",
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::Network => "network",
            ErrorCategory::Upstream => "upstream",
            ErrorCategory::MalformedResponse => "malformed-response",
            ErrorCategory::InvalidRequest => "invalid-request",
        })
    }
}

fn status_category(status: u16) -> ErrorCategory {
    match status {
        401 => ErrorCategory::Auth,
        404 => ErrorCategory::NotFound,
        _ => ErrorCategory::Upstream,
    }
}

impl FeedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::InvalidRange { .. } => ErrorCategory::InvalidRequest,
            FeedError::Http { .. } => ErrorCategory::Network,
            FeedError::Status { status, .. } => status_category(*status),
            FeedError::InvalidTime { .. }
            | FeedError::InvalidField { .. } => ErrorCategory::MalformedResponse,
        }
    }
}

impl ApiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Unauthorized => ErrorCategory::Auth,
            ApiError::NotFound => ErrorCategory::NotFound,
            ApiError::Status(status) => status_category(*status),
            ApiError::Network(_) => ErrorCategory::Network,
            ApiError::MalformedResponse(_)
            | ApiError::MissingField(_)
            | ApiError::InvalidField { .. } => ErrorCategory::MalformedResponse,
        }
    }
}

/// A failed refresh cycle. Previously published data stays in place.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("sensor feed: {0}")]
    Feed(#[from] FeedError),

    #[error("current conditions: {0}")]
    Current(#[source] ApiError),

    #[error("forecast: {0}")]
    Forecast(#[source] ApiError),
}

impl RefreshError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RefreshError::Feed(e) => e.category(),
            RefreshError::Current(e) | RefreshError::Forecast(e) => e.category(),
        }
    }
}
