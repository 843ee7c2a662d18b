//! Gateway timestamp formatting.
//!
//! The gateway expects ISO-8601 timestamps with an explicit numeric offset
//! (`2024-05-01T14:30:00+02:00`), never the `Z` designator.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

const GATEWAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Formats `date` as `YYYY-MM-DDTHH:mm:ss±HH:MM` in the date's own offset.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use simplepay::timestamp::to_iso_string_with_timezone;
///
/// let budapest = FixedOffset::east_opt(2 * 3600).unwrap();
/// let date = budapest.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap();
/// assert_eq!(to_iso_string_with_timezone(&date), "2024-05-01T14:30:00+02:00");
/// ```
#[must_use]
pub fn to_iso_string_with_timezone<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format(GATEWAY_FORMAT).to_string()
}

/// Formats the current local time for fields such as the IPN `receiveDate`.
#[must_use]
pub fn now() -> String {
    to_iso_string_with_timezone(&Local::now())
}
