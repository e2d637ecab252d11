use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;

use crate::error::AppError;

/// Wall-clock format used for every displayed time: 24-hour `HH:MM:SS`.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// A fixed shift from UTC parsed from the service's `UTC+HH:MM` notation.
///
/// The parse is strict: the whole string must match, with exactly two hour
/// digits and two minute digits. `UTC+5:30`, `GMT+05:30` and `UTC+05:30 ` are
/// all rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset(FixedOffset);

impl UtcOffset {
    pub fn as_fixed(&self) -> FixedOffset {
        self.0
    }
}

impl FromStr for UtcOffset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidOffset(s.to_string());

        let rest = s.strip_prefix("UTC").ok_or_else(invalid)?;
        let bytes = rest.as_bytes();
        if bytes.len() != 6 || bytes[3] != b':' {
            return Err(invalid());
        }
        let sign = match bytes[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return Err(invalid()),
        };

        let hours = two_digits(&bytes[1..3]).ok_or_else(invalid)?;
        let minutes = two_digits(&bytes[4..6]).ok_or_else(invalid)?;
        if minutes > 59 {
            return Err(invalid());
        }

        // east_opt rejects anything a full day or more away from UTC
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(UtcOffset)
            .ok_or_else(invalid)
    }
}

fn two_digits(bytes: &[u8]) -> Option<i32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(i32::from(a - b'0') * 10 + i32::from(b - b'0'))
        }
        _ => None,
    }
}

/// Formats `now` shifted by a `UTC+HH:MM` offset string.
///
/// Returns `None` when the offset cannot be parsed; callers treat that as
/// "offset unavailable" rather than an error.
pub fn time_at_offset(now: DateTime<Utc>, offset: &str) -> Option<String> {
    let offset: UtcOffset = offset.parse().ok()?;
    Some(
        now.with_timezone(&offset.as_fixed())
            .format(CLOCK_FORMAT)
            .to_string(),
    )
}

/// Formats `now` in the civil time of an IANA zone, daylight saving included.
pub fn time_in_zone(now: DateTime<Utc>, zone: Tz) -> String {
    now.with_timezone(&zone).format(CLOCK_FORMAT).to_string()
}
