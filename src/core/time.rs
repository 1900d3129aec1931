use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed text layout of `flash_start_time`, e.g. `2018-03-04 09:24:30.274144`.
/// The fractional part is optional.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// UNIX time of the TAI93 epoch as used by ISS LIS flash files (1992-01-01 23:59:59 UTC)
const TAI93_EPOCH_UNIX_SECS: i64 = 694_310_399;

/// How `flash_start_time` is encoded by the data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartTimeFormat {
    /// Text in [`START_TIME_FORMAT`], UTC
    #[default]
    Text,
    /// Seconds since the TAI93 epoch
    Tai93,
}

/// Convert a TAI93 timestamp (seconds) to UTC.
///
/// Returns `None` for non-finite input or values outside chrono's range.
pub fn tai93_to_utc(tai93_seconds: f64) -> Option<DateTime<Utc>> {
    if !tai93_seconds.is_finite() {
        return None;
    }
    let whole = tai93_seconds.trunc();
    // `as` saturates, so anything at or past the i64 bounds is out of range
    if whole <= i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    let micros = ((tai93_seconds - whole) * 1_000_000.0).round() as i64;
    let secs = (whole as i64).checked_add(TAI93_EPOCH_UNIX_SECS)?;
    DateTime::from_timestamp(secs, 0)?
        .checked_add_signed(chrono::Duration::microseconds(micros))
}

/// Parse a start time in the fixed text format into epoch milliseconds.
///
/// Sub-second digits are accepted but dropped: playback works at one-second
/// resolution, so flashes inside the same second share a timestamp.
pub fn parse_start_text(text: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(text.trim(), START_TIME_FORMAT)
        .ok()
        .map(|t| t.and_utc().timestamp() * 1000)
}

/// Truncate a UTC instant to whole seconds, in epoch milliseconds
pub fn whole_second_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp() * 1000
}
