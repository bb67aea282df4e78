//! Runtime value representation.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use common_error::{QuarryError, QuarryResult};
use serde::{Deserialize, Serialize};

use super::{DataType, SessionTimeZone};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
pub(crate) const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Runtime value in Quarry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Date (days since Unix epoch).
    Date(i32),
    /// Timestamp (nanoseconds since Unix epoch, UTC).
    Timestamp(i64),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Self::Float64(f) => Some(*f),
            Self::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        self.data_type().display_name()
    }

    /// The data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Bool(_) => DataType::Bool,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::String(_) => DataType::String,
            Self::Date(_) => DataType::Date,
            Self::Timestamp(_) => DataType::Timestamp,
        }
    }

    /// Compare two non-null values of compatible types.
    ///
    /// Int64 and Float64 compare numerically. Returns `None` when either
    /// side is null or the types are not comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(l), Self::Bool(r)) => Some(l.cmp(r)),
            (Self::Int64(l), Self::Int64(r)) => Some(l.cmp(r)),
            (Self::Float64(l), Self::Float64(r)) => l.partial_cmp(r),
            (Self::Int64(l), Self::Float64(r)) => (*l as f64).partial_cmp(r),
            (Self::Float64(l), Self::Int64(r)) => l.partial_cmp(&(*r as f64)),
            (Self::String(l), Self::String(r)) => Some(l.cmp(r)),
            (Self::Date(l), Self::Date(r)) => Some(l.cmp(r)),
            (Self::Timestamp(l), Self::Timestamp(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    /// Parse a textual value into the given type.
    ///
    /// Timestamps without an explicit offset are wall-clock times in `time_zone`
    /// and are normalized to UTC.
    pub fn parse_as(raw: &str, data_type: &DataType, time_zone: &SessionTimeZone) -> QuarryResult<Self> {
        let trimmed = raw.trim();
        let invalid = || {
            QuarryError::value_error(format!("cannot interpret '{raw}' as {data_type}"))
        };

        match data_type {
            DataType::Null => Ok(Self::Null),
            DataType::String => Ok(Self::String(raw.to_string())),
            DataType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(invalid()),
            },
            DataType::Int64 => trimmed.parse().map(Self::Int64).map_err(|_| invalid()),
            DataType::Float64 => trimmed.parse().map(Self::Float64).map_err(|_| invalid()),
            DataType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|date| Self::Date(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
                .map_err(|_| invalid()),
            DataType::Timestamp => {
                let naive = parse_naive_timestamp(trimmed).ok_or_else(invalid)?;
                time_zone
                    .local_to_utc_nanos(&naive)
                    .map(Self::Timestamp)
                    .ok_or_else(invalid)
            }
        }
    }

    /// Convert this value to another type, following SQL `CAST` rules.
    pub fn cast_to(&self, target: &DataType, time_zone: &SessionTimeZone) -> QuarryResult<Self> {
        match (self, target) {
            (Self::Null, _) => Ok(Self::Null),
            (v, t) if v.data_type() == *t => Ok(v.clone()),
            (Self::String(s), t) => Self::parse_as(s, t, time_zone),
            (Self::Int64(i), DataType::Float64) => Ok(Self::Float64(*i as f64)),
            (Self::Float64(f), DataType::Int64) => Ok(Self::Int64(f.trunc() as i64)),
            (Self::Bool(b), DataType::Int64) => Ok(Self::Int64(i64::from(*b))),
            (Self::Int64(i), DataType::Bool) => Ok(Self::Bool(*i != 0)),
            (Self::Date(days), DataType::Timestamp) => time_zone
                .date_to_utc_nanos(*days)
                .map(Self::Timestamp)
                .ok_or_else(|| QuarryError::value_error(format!("date {days} out of range"))),
            (v, DataType::String) => Ok(Self::String(v.to_plain_string())),
            (v, t) => Err(QuarryError::type_error(format!(
                "cannot cast {} to {t}",
                v.type_name()
            ))),
        }
    }

    fn to_plain_string(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int64(i) => i.to_string(),
            Self::Float64(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::Date(days) => NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                .map_or_else(|| days.to_string(), |d| d.to_string()),
            Self::Timestamp(nanos) => nanos.to_string(),
        }
    }
}

fn parse_naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int64(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}
