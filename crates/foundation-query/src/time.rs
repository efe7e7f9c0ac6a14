//! Time ranges for searches.
//!
//! The executor passes a [`TimeRange`] through untouched; only the HTTP
//! client resolves it to epoch microseconds, right before sending.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::error::{QueryError, Result};

/// One end of a time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    /// The moment the request is sent.
    Now,
    /// An offset into the past from now, e.g. `-1h`.
    Relative(Duration),
    /// Absolute epoch microseconds.
    Absolute(i64),
}

impl TimeSpec {
    /// Resolve to epoch microseconds relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidTimeSpec` if a relative offset reaches
    /// outside the representable date range.
    pub fn resolve(self, now: DateTime<Utc>) -> Result<i64> {
        match self {
            Self::Now => Ok(now.timestamp_micros()),
            Self::Relative(offset) => now
                .checked_sub_signed(offset)
                .map(|start| start.timestamp_micros())
                .ok_or_else(|| {
                    QueryError::InvalidTimeSpec(format!(
                        "lookback of {}s is out of range",
                        offset.num_seconds()
                    ))
                }),
            Self::Absolute(micros) => Ok(micros),
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("now"),
            Self::Relative(d) => write!(f, "-{}s", d.num_seconds()),
            Self::Absolute(micros) => write!(f, "{micros}"),
        }
    }
}

impl FromStr for TimeSpec {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "now" {
            return Ok(Self::Now);
        }
        if let Some(rest) = s.strip_prefix('-') {
            return parse_duration(rest).map(Self::Relative);
        }
        s.parse::<i64>()
            .map(Self::Absolute)
            .map_err(|_| QueryError::InvalidTimeSpec(s.to_string()))
    }
}

/// Parse a lookback duration such as `1h`, `30m`, `7d`, `45s`, or `2w`.
///
/// # Errors
///
/// Returns `QueryError::InvalidTimeSpec` for anything else, including zero.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let invalid = || QueryError::InvalidTimeSpec(s.to_string());
    let s = s.trim();
    let unit_at = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (amount, unit) = s.split_at(unit_at);
    let amount: i64 = amount.parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(invalid());
    }
    let duration = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    };
    duration.ok_or_else(invalid)
}

/// A search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: TimeSpec,
    /// End.
    pub end: TimeSpec,
}

impl TimeRange {
    /// Create a range from explicit endpoints.
    #[must_use]
    pub const fn new(start: TimeSpec, end: TimeSpec) -> Self {
        Self { start, end }
    }

    /// The window `[now - lookback, now]`.
    #[must_use]
    pub const fn last(lookback: Duration) -> Self {
        Self::new(TimeSpec::Relative(lookback), TimeSpec::Now)
    }

    /// The last hour.
    #[must_use]
    pub fn last_hour() -> Self {
        Self::last(Duration::hours(1))
    }

    /// The last 24 hours.
    #[must_use]
    pub fn last_day() -> Self {
        Self::last(Duration::hours(24))
    }

    /// Parse a `--last` style lookback such as `1h`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidTimeSpec` if the duration is malformed
    /// or reaches past the representable date range.
    pub fn parse_last(lookback: &str) -> Result<Self> {
        let range = Self::last(parse_duration(lookback)?);
        range.resolve(Utc::now())?;
        Ok(range)
    }

    /// Resolve both ends to epoch microseconds.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidTimeSpec` if either end is out of range.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<(i64, i64)> {
        Ok((self.start.resolve(now)?, self.end.resolve(now)?))
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::last_hour()
    }
}
