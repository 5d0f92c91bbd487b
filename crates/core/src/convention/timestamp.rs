use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Storage format of every timestamp column (UTC, microsecond precision).
///
/// Values in this format sort lexicographically in chronological order, which
/// is what keyset pagination and the alive filter rely on.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// The "not set / not deleted" value. Sorts after every real timestamp.
pub const SENTINEL: &str = "9999-01-01 00:00:00.000000";

/// Errors that can occur when parsing a timestamp.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Invalid timestamp '{0}': expected YYYY-MM-DD HH:MM:SS.ffffff")]
    Invalid(String),
}

/// A UTC timestamp truncated to microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Returns the sentinel timestamp.
    pub fn sentinel() -> Self {
        NaiveDate::from_ymd_opt(9999, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
            .unwrap_or(Self(NaiveDateTime::MAX))
    }

    /// Builds a timestamp from a UTC datetime, dropping sub-microsecond precision.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.naive_utc().trunc_subsecs(6))
    }

    /// Returns true if this is the sentinel value.
    pub fn is_sentinel(&self) -> bool {
        *self >= Self::sentinel()
    }

    /// Returns true if this is a real (non-sentinel) timestamp.
    pub fn is_set(&self) -> bool {
        !self.is_sentinel()
    }

    /// Returns the timestamp as a UTC datetime.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map(|dt| Self(dt.trunc_subsecs(6)))
            .map_err(|_| TimestampError::Invalid(s.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle timestamps carried by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamps {
    pub tm_create: Timestamp,
    pub tm_update: Timestamp,
    pub tm_delete: Timestamp,
}

impl Timestamps {
    /// Returns true once a soft delete has been recorded.
    pub fn is_deleted(&self) -> bool {
        self.tm_delete.is_set()
    }
}
