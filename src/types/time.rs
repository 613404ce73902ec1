//! Absolute time attributes
//!
//! `Time` holds millisecond resolution, `FineTime` nanosecond resolution,
//! both as UTC offsets from the Unix epoch. The wire literal is ISO-8601
//! with the fractional part padded or truncated to exactly the type's
//! resolution.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::protocol::{Error, Result};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const FINE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

/// Absolute date and time at millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(i64);

impl Time {
    /// Create from milliseconds since the Unix epoch
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Current wall-clock time
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Milliseconds since the Unix epoch
    #[must_use]
    pub const fn unix_millis(self) -> i64 {
        self.0
    }

    /// Wire literal: `YYYY-MM-DDThh:mm:ss.sss`
    #[must_use]
    pub fn format(self) -> String {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(dt) => dt.format(TIME_FORMAT).to_string(),
            // i64 milliseconds that chrono cannot place on the calendar
            None => String::from("0000-00-00T00:00:00.000"),
        }
    }

    /// Parse a wire literal back to a timestamp
    pub fn parse(text: &str) -> Result<Self> {
        let dt = NaiveDateTime::parse_from_str(text, TIME_FORMAT).map_err(|_| {
            Error::MalformedLiteral {
                attribute: "Time",
                text: text.to_string(),
            }
        })?;
        Ok(Self(dt.and_utc().timestamp_millis()))
    }
}

/// Absolute date and time at nanosecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FineTime(i64);

impl FineTime {
    /// Create from nanoseconds since the Unix epoch
    #[must_use]
    pub const fn from_unix_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Current wall-clock time
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    /// Nanoseconds since the Unix epoch
    #[must_use]
    pub const fn unix_nanos(self) -> i64 {
        self.0
    }

    /// Wire literal: `YYYY-MM-DDThh:mm:ss.sssssssss`
    #[must_use]
    pub fn format(self) -> String {
        let secs = self.0.div_euclid(1_000_000_000);
        let nanos = self.0.rem_euclid(1_000_000_000) as u32;
        match DateTime::<Utc>::from_timestamp(secs, nanos) {
            Some(dt) => dt.format(FINE_TIME_FORMAT).to_string(),
            None => String::from("0000-00-00T00:00:00.000000000"),
        }
    }

    /// Parse a wire literal back to a timestamp
    pub fn parse(text: &str) -> Result<Self> {
        let dt = NaiveDateTime::parse_from_str(text, FINE_TIME_FORMAT).map_err(|_| {
            Error::MalformedLiteral {
                attribute: "FineTime",
                text: text.to_string(),
            }
        })?;
        let utc = dt.and_utc();
        let nanos = utc
            .timestamp()
            .checked_mul(1_000_000_000)
            .and_then(|n| n.checked_add(i64::from(utc.timestamp_subsec_nanos())))
            .ok_or_else(|| Error::MalformedLiteral {
                attribute: "FineTime",
                text: text.to_string(),
            })?;
        Ok(Self(nanos))
    }
}
