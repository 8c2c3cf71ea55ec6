//! Stored date coercion.
//!
//! Documents written by different clients store dates as database timestamp
//! objects, ISO strings or nothing at all. [`StoredDate`] names every shape
//! explicitly and [`StoredDate::to_date`] turns any of them into a
//! `DateTime<Utc>`.
// region:    --- Imports
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::warn;

// endregion: --- Imports

// region:    --- Timestamp
/// Database timestamp: seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn to_date(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanoseconds)
    }

    /// Storable JSON form of this timestamp.
    pub fn to_value(self) -> Value {
        json!({ "seconds": self.seconds, "nanoseconds": self.nanoseconds })
    }

    fn from_object(object: &serde_json::Map<String, Value>) -> Option<Self> {
        let seconds = object
            .get("seconds")
            .or_else(|| object.get("_seconds"))?
            .as_i64()?;
        let nanoseconds = match object.get("nanoseconds").or_else(|| object.get("_nanoseconds")) {
            Some(value) => u32::try_from(value.as_u64()?).ok()?,
            None => 0,
        };
        Some(Self {
            seconds,
            nanoseconds,
        })
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(date: DateTime<Utc>) -> Self {
        Self {
            seconds: date.timestamp(),
            nanoseconds: date.timestamp_subsec_nanos(),
        }
    }
}
// endregion: --- Timestamp

// region:    --- Stored Date
/// Every representation a stored date field has been observed in.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StoredDate {
    /// Absent, `null` or another falsy value
    #[default]
    Missing,
    Native(DateTime<Utc>),
    Timestamp(Timestamp),
    IsoString(String),
    /// Anything else; never resolves
    Other(Value),
}

impl StoredDate {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Self::Missing,
            Value::String(text) if text.is_empty() => Self::Missing,
            Value::Number(number) if number.as_f64() == Some(0.0) => Self::Missing,
            Value::String(text) => Self::IsoString(text.clone()),
            Value::Object(object) => match Timestamp::from_object(object) {
                Some(timestamp) => Self::Timestamp(timestamp),
                None => Self::Other(value.clone()),
            },
            other => Self::Other(other.clone()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The date this value denotes, or `None` when it is missing or unparseable.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Missing | Self::Other(_) => None,
            Self::Native(date) => Some(*date),
            Self::Timestamp(timestamp) => timestamp.to_date(),
            Self::IsoString(text) => parse_date_string(text),
        }
    }

    /// Canonical date for this value. Missing and unparseable values become the current time.
    pub fn to_date(&self) -> DateTime<Utc> {
        if let Some(date) = self.resolve() {
            return date;
        }
        if !self.is_missing() {
            warn!(
                "{:<12} --> unparseable stored date {:?}, using current time",
                "Date", self
            );
        }
        Utc::now()
    }

    /// Like [`to_date`](Self::to_date) but keeps absence as `None`, for optional fields.
    pub fn to_optional_date(&self) -> Option<DateTime<Utc>> {
        if self.is_missing() {
            None
        } else {
            Some(self.to_date())
        }
    }
}

impl From<DateTime<Utc>> for StoredDate {
    fn from(date: DateTime<Utc>) -> Self {
        Self::Native(date)
    }
}

impl<'de> Deserialize<'de> for StoredDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Normalizes any stored date value into a `DateTime<Utc>`.
pub fn normalize(value: &StoredDate) -> DateTime<Utc> {
    value.to_date()
}

fn parse_date_string(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
// endregion: --- Stored Date

// endregion: --- Tests
