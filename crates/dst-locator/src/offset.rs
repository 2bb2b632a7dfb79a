//! UTC offsets and the sources that answer "what is the offset at this instant?".
//!
//! The locator only ever asks one question of a timezone, so it is expressed as
//! the small [`OffsetSource`] trait. The IANA database compiled into
//! `chrono-tz` is the default source; fixed offsets and UTC are sources too,
//! which never transition.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::LocatorError;

/// A signed difference between local civil time and UTC, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UtcOffset(i32);

impl UtcOffset {
    pub const ZERO: UtcOffset = UtcOffset(0);

    pub const fn from_seconds(seconds: i32) -> Self {
        UtcOffset(seconds)
    }

    pub const fn from_minutes(minutes: i32) -> Self {
        UtcOffset(minutes * 60)
    }

    pub const fn seconds(self) -> i32 {
        self.0
    }

    /// Convert to a `chrono::FixedOffset`, if within chrono's ±24h range.
    pub fn to_fixed(self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.0)
    }
}

impl From<FixedOffset> for UtcOffset {
    fn from(offset: FixedOffset) -> Self {
        UtcOffset(offset.local_minus_utc())
    }
}

impl fmt::Display for UtcOffset {
    /// `+HH:MM`, or `+HH:MM:SS` for offsets with a seconds component.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 >= 0 { "+" } else { "-" };
        let abs_secs = self.0.unsigned_abs();
        let hours = abs_secs / 3600;
        let minutes = (abs_secs % 3600) / 60;
        let seconds = abs_secs % 60;
        if seconds == 0 {
            write!(f, "{sign}{hours:02}:{minutes:02}")
        } else {
            write!(f, "{sign}{hours:02}:{minutes:02}:{seconds:02}")
        }
    }
}

/// Anything that can report its UTC offset at a given instant.
///
/// Implementations must be pure: the same instant always yields the same
/// offset. The locator re-verifies its final answer and reports a
/// [`LocatorError::SearchInvariantViolation`] when a source breaks this.
pub trait OffsetSource {
    fn utc_offset(&self, at: DateTime<Utc>) -> UtcOffset;

    /// Whether the source is on its summer offset at `at`.
    ///
    /// Sources without that notion never observe DST.
    fn is_dst(&self, _at: DateTime<Utc>) -> bool {
        false
    }
}

impl OffsetSource for Tz {
    fn utc_offset(&self, at: DateTime<Utc>) -> UtcOffset {
        let offset = self.offset_from_utc_datetime(&at.naive_utc());
        UtcOffset(offset.fix().local_minus_utc())
    }

    /// Summer time is the larger of the year's January and July offsets.
    ///
    /// The tzdata DST flag is not used: zones with negative DST such as
    /// Europe/Dublin mark winter as the daylight-saving period.
    fn is_dst(&self, at: DateTime<Utc>) -> bool {
        let year = at.year();
        let sample = |month| {
            Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0)
                .single()
                .map(|t| self.utc_offset(t))
        };
        let (Some(january), Some(july)) = (sample(1), sample(7)) else {
            return false;
        };
        january != july && self.utc_offset(at) > january.min(july)
    }
}

impl OffsetSource for FixedOffset {
    fn utc_offset(&self, _at: DateTime<Utc>) -> UtcOffset {
        UtcOffset(self.local_minus_utc())
    }
}

impl OffsetSource for Utc {
    fn utc_offset(&self, _at: DateTime<Utc>) -> UtcOffset {
        UtcOffset::ZERO
    }
}

impl<S: OffsetSource + ?Sized> OffsetSource for &S {
    fn utc_offset(&self, at: DateTime<Utc>) -> UtcOffset {
        (**self).utc_offset(at)
    }

    fn is_dst(&self, at: DateTime<Utc>) -> bool {
        (**self).is_dst(at)
    }
}

/// Parse an IANA timezone identifier into a `Tz`.
///
/// # Errors
///
/// Returns [`LocatorError::InvalidTimezone`] if the identifier is not in the
/// compiled IANA database.
pub fn parse_timezone(s: &str) -> Result<Tz, LocatorError> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| LocatorError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse an RFC 3339 datetime string into `DateTime<Utc>`.
///
/// # Errors
///
/// Returns [`LocatorError::InvalidDatetime`] if the string cannot be parsed.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, LocatorError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LocatorError::InvalidDatetime(format!("'{}': {}", s, e)))
}
