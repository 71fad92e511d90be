//! Chat message records as supplied by the message store.
//!
//! The engine never mutates these; grouping reads them and produces a fresh
//! annotation set each pass. Field aliases accept the store's wire names
//! (`_id`, `ts`, `u`, `tmid`) so raw store payloads deserialize directly.

use crate::error::FormatError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric timestamps at or above this magnitude are epoch milliseconds.
///
/// `1e11` seconds is in the year 5138, while `1e11` milliseconds is early
/// 1973, so the two ranges do not overlap for realistic chat data.
pub const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A message from the store. Every field is optional at this boundary so a
/// malformed record can be skipped instead of failing the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "ts", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(
        default,
        alias = "u",
        alias = "sender",
        deserialize_with = "deserialize_sender",
        skip_serializing_if = "Option::is_none"
    )]
    pub sender_id: Option<String>,
    #[serde(default, alias = "tmid", skip_serializing_if = "Option::is_none")]
    pub thread_parent_id: Option<String>,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        sender_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            timestamp: Some(RawTimestamp::At(timestamp)),
            sender_id: Some(sender_id.into()),
            thread_parent_id: None,
        }
    }

    pub fn in_thread(mut self, parent_id: impl Into<String>) -> Self {
        self.thread_parent_id = Some(parent_id.into());
        self
    }

    /// Thread replies never appear in the main timeline.
    pub fn is_thread_reply(&self) -> bool {
        self.thread_parent_id
            .as_deref()
            .is_some_and(|parent| !parent.trim().is_empty())
    }

    /// Non-blank identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Non-blank sender identifier, if any.
    pub fn sender(&self) -> Option<&str> {
        self.sender_id
            .as_deref()
            .map(str::trim)
            .filter(|sender| !sender.is_empty())
    }
}

/// A timestamp as it arrives from the store, before unit normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Epoch seconds or epoch millis; see [`EPOCH_MILLIS_THRESHOLD`].
    Epoch(i64),
    Fractional(f64),
    /// RFC 3339 date-time or a decimal epoch number.
    Text(String),
    /// `{"$date": <millis>}` as emitted by some store adapters.
    Wrapped {
        #[serde(rename = "$date")]
        date: i64,
    },
    /// An already-normalized instant. Serializes as RFC 3339.
    At(DateTime<Utc>),
}

impl RawTimestamp {
    /// Normalize to a UTC instant.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, FormatError> {
        match self {
            Self::Epoch(value) | Self::Wrapped { date: value } => epoch_to_datetime(*value),
            Self::Fractional(value) => fractional_to_datetime(*value),
            Self::Text(text) => parse_timestamp_text(text),
            Self::At(instant) => Ok(*instant),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::At(value)
    }
}

impl From<i64> for RawTimestamp {
    fn from(value: i64) -> Self {
        Self::Epoch(value)
    }
}

/// Interpret an integer as epoch seconds or epoch millis by magnitude.
pub fn epoch_to_datetime(value: i64) -> Result<DateTime<Utc>, FormatError> {
    let parsed = if value.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD as u64 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    };
    parsed.ok_or_else(|| FormatError::InvalidTimestamp(value.to_string()))
}

/// Interpret integer epoch seconds without the millis heuristic.
pub fn epoch_seconds_to_datetime(seconds: i64) -> Result<DateTime<Utc>, FormatError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| FormatError::InvalidTimestamp(seconds.to_string()))
}

fn fractional_to_datetime(value: f64) -> Result<DateTime<Utc>, FormatError> {
    if !value.is_finite() {
        return Err(FormatError::InvalidTimestamp(value.to_string()));
    }
    let millis = if value.abs() >= EPOCH_MILLIS_THRESHOLD as f64 {
        value.round()
    } else {
        (value * 1000.0).round()
    };
    if millis.abs() >= i64::MAX as f64 {
        return Err(FormatError::InvalidTimestamp(value.to_string()));
    }
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or_else(|| FormatError::InvalidTimestamp(value.to_string()))
}

fn parse_timestamp_text(text: &str) -> Result<DateTime<Utc>, FormatError> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return epoch_to_datetime(value);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    Err(FormatError::InvalidTimestamp(text.to_string()))
}

/// Accepts either a plain sender id or a user object (`{"_id": "..."}`).
fn deserialize_sender<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SenderRef {
        Id(String),
        User {
            #[serde(alias = "_id")]
            id: String,
        },
    }

    let sender = Option::<SenderRef>::deserialize(deserializer)?;
    Ok(sender.map(|sender| match sender {
        SenderRef::Id(id) | SenderRef::User { id } => id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn small_epoch_values_are_seconds() {
        let dt = epoch_to_datetime(1_700_000_000).expect("valid seconds");
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
    }

    #[test]
    fn large_epoch_values_are_millis() {
        let dt = epoch_to_datetime(1_700_000_000_500).expect("valid millis");
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn out_of_range_seconds_are_invalid() {
        assert!(matches!(
            epoch_seconds_to_datetime(i64::MAX),
            Err(FormatError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn text_timestamps_accept_rfc3339_and_numbers() {
        let rfc = RawTimestamp::Text("2024-03-01T12:00:00Z".to_string());
        let num = RawTimestamp::Text(" 1709294400 ".to_string());
        assert_eq!(rfc.to_datetime().unwrap(), num.to_datetime().unwrap());
        assert!(RawTimestamp::Text("yesterday".to_string()).to_datetime().is_err());
    }

    #[test]
    fn fractional_seconds_keep_millis() {
        let dt = RawTimestamp::Fractional(1_700_000_000.25)
            .to_datetime()
            .unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
        assert!(RawTimestamp::Fractional(f64::NAN).to_datetime().is_err());
    }

    #[test]
    fn store_payload_deserializes_with_wire_names() {
        let msg: Message = serde_json::from_str(
            r#"{"_id":"m1","ts":{"$date":1709294400000},"u":{"_id":"alice","username":"alice"},"tmid":"p1"}"#,
        )
        .expect("parse store message");
        assert_eq!(msg.id(), Some("m1"));
        assert_eq!(msg.sender(), Some("alice"));
        assert!(msg.is_thread_reply());
        assert_eq!(
            msg.timestamp.unwrap().to_datetime().unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn blank_thread_parent_is_not_a_reply() {
        let msg = Message::new("m1", Utc::now(), "alice").in_thread("  ");
        assert!(!msg.is_thread_reply());
    }
}
