//! Time and timestamp helpers.

use chrono::{DateTime, NaiveTime, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for `last_executed`, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse a `HH:MM` time of day (24-hour clock).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTime`] when `value` is not a valid `HH:MM`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ValidationError::InvalidTime(value.to_string()))
}
