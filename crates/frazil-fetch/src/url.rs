//! Object URL construction.

use chrono::NaiveDate;
use frazil_types::{COMPACT_DATE_FORMAT, EventType};

/// Base URL for the public BitMEX historical data bucket.
pub const BASE_URL: &str = "https://s3-eu-west-1.amazonaws.com/public.bitmex.com/data";

/// Builds the URL for one day's compressed CSV object.
///
/// URL format: `{base}/{type}/{YYYYMMDD}.csv.gz`
///
/// # Example
///
/// ```
/// use frazil_fetch::url::{BASE_URL, object_url};
/// use frazil_types::EventType;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2018, 9, 1).unwrap();
/// let url = object_url(BASE_URL, date, EventType::Trade);
/// assert_eq!(
///     url,
///     "https://s3-eu-west-1.amazonaws.com/public.bitmex.com/data/trade/20180901.csv.gz"
/// );
/// ```
#[must_use]
pub fn object_url(base: &str, date: NaiveDate, event_type: EventType) -> String {
    format!(
        "{}/{}/{}.csv.gz",
        base.trim_end_matches('/'),
        event_type.as_str(),
        date.format(COMPACT_DATE_FORMAT)
    )
}
