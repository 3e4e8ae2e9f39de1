//! Error types for frazil.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for frazil operations.
pub type Result<T> = std::result::Result<T, FrazilError>;

/// Errors that can occur while downloading and archiving tick data.
///
/// All variants except [`FrazilError::DateRange`] are local to one
/// (date, type) pipeline; the coordinator never lets one pipeline's
/// failure abort its siblings.
#[derive(Error, Debug)]
pub enum FrazilError {
    /// HTTP transport failure (connection, timeout) after retries.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server responded with a non-2xx status.
    #[error("Unexpected status: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Gzip decoding of the response body failed.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A line could not be parsed into an event.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Too many malformed events in a single stream.
    #[error("Too many malformed events ({count}), aborting stream")]
    TooManyMalformed {
        /// Number of malformed events observed.
        count: u64,
    },

    /// Archive (zip) writing failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The pipeline was cancelled before completing.
    #[error("Cancelled")]
    Cancelled,
}

/// Error for invalid dates and date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },

    /// Date string is not a valid compact date.
    #[error("Invalid date '{0}', expected YYYYMMDD")]
    InvalidDate(String),
}
