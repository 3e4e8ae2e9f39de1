//! CSV row to typed event normalization.

use chrono::{NaiveTime, Timelike};
use frazil_types::{Event, EventType, QuoteTick, Side, TradeTick};
use thiserror::Error;

/// Minimum field counts per row type.
const QUOTE_FIELDS: usize = 6;
const TRADE_FIELDS: usize = 5;

/// Errors that can occur while normalizing a CSV row.
///
/// A parse error marks one malformed event; it is never silently mapped to
/// zero, since a zero price would corrupt the `low` extremum of its bucket.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Row has fewer fields than the schema requires.
    #[error("Expected at least {expected} fields, got {got}")]
    TooFewFields {
        /// Required field count.
        expected: usize,
        /// Observed field count.
        got: usize,
    },

    /// Timestamp token could not be converted to a millisecond offset.
    #[error("Invalid timestamp '{0}'")]
    Timestamp(String),

    /// A numeric field failed to parse.
    #[error("Invalid {field} '{value}'")]
    Numeric {
        /// Name of the offending field.
        field: &'static str,
        /// The unparseable token.
        value: String,
    },

    /// Trade side was neither `Buy` nor `Sell`.
    #[error("Invalid side '{0}'")]
    Side(String),
}

/// Parses one CSV row into a normalized event.
///
/// Returns `Ok(None)` when the row's symbol field does not match the target
/// instrument; this also drops the file's header row, whose symbol field is
/// the literal `symbol`.
///
/// Row schemas:
/// - quote: `timestamp,symbol,bidSize,bidPrice,askPrice,askSize`
/// - trade: `timestamp,symbol,side,size,price,tickType,matchId,...`
///
/// The timestamp is a composite `YYYY-MM-DDDHH:MM:SS.nnnnnnnnn` token (the
/// date and time separated by a literal `D`); it is rewritten as the integer
/// millisecond offset from the timestamp's own UTC midnight.
///
/// # Errors
///
/// Returns an error if any field of a matching row fails to parse.
pub fn parse_line(
    line: &str,
    event_type: EventType,
    symbol: &str,
) -> Result<Option<Event>, ParseError> {
    let fields: Vec<&str> = line.split(',').collect();
    let required = match event_type {
        EventType::Quote => QUOTE_FIELDS,
        EventType::Trade => TRADE_FIELDS,
    };
    if fields.len() < required {
        // A row for another instrument can still be short; only matching
        // rows get strict treatment, so check the symbol field first when
        // it exists at all.
        if fields.get(1).is_some_and(|s| *s != symbol) || fields.len() < 2 {
            return Ok(None);
        }
        return Err(ParseError::TooFewFields {
            expected: required,
            got: fields.len(),
        });
    }

    if fields[1] != symbol {
        return Ok(None);
    }

    let offset_ms = ms_of_day(fields[0])?;

    let event = match event_type {
        EventType::Quote => Event::Quote(QuoteTick {
            offset_ms,
            bid_size: parse_f64("bidSize", fields[2])?,
            bid_price: parse_f64("bidPrice", fields[3])?,
            ask_price: parse_f64("askPrice", fields[4])?,
            ask_size: parse_f64("askSize", fields[5])?,
        }),
        EventType::Trade => Event::Trade(TradeTick {
            offset_ms,
            side: fields[2]
                .parse::<Side>()
                .map_err(|()| ParseError::Side(fields[2].to_string()))?,
            size: parse_f64("size", fields[3])?,
            price: parse_f64("price", fields[4])?,
        }),
    };

    Ok(Some(event))
}

/// Converts a composite timestamp token to milliseconds since its own
/// UTC midnight.
///
/// Only the time-of-day part matters: the offset is relative to the
/// timestamp's own date, so the date prefix is skipped rather than parsed.
fn ms_of_day(token: &str) -> Result<i64, ParseError> {
    let (_, time_part) = token
        .split_once('D')
        .ok_or_else(|| ParseError::Timestamp(token.to_string()))?;
    let time = NaiveTime::parse_from_str(time_part, "%H:%M:%S%.f")
        .map_err(|_| ParseError::Timestamp(token.to_string()))?;
    let millis = i64::from(time.nanosecond() / 1_000_000);
    Ok(i64::from(time.num_seconds_from_midnight()) * 1000 + millis)
}

fn parse_f64(field: &'static str, value: &str) -> Result<f64, ParseError> {
    value.parse::<f64>().map_err(|_| ParseError::Numeric {
        field,
        value: value.to_string(),
    })
}
