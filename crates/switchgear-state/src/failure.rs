//! Failure records and their wire format

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failure of the protected operation
///
/// Records are immutable once created. When persisted through a shared store
/// they are encoded as a JSON object with the fields `error`, `message` and
/// `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(rename = "error")]
    error_kind: String,
    message: String,
    #[serde(with = "wire_timestamp")]
    timestamp: DateTime<Utc>,
}

impl FailureRecord {
    /// Create a record stamped with the current UTC time
    pub fn new(error_kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_timestamp(error_kind, message, Utc::now())
    }

    /// Create a record with an explicit timestamp
    pub fn with_timestamp(
        error_kind: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            error_kind: error_kind.into(),
            message: message.into(),
            timestamp,
        }
    }

    /// Capture an error raised by the protected operation
    ///
    /// The kind is the error's type name without its module path or generic
    /// parameters; the message is its `Display` output.
    pub fn from_error<E: fmt::Display + ?Sized>(err: &E) -> Self {
        Self::new(Self::kind_of::<E>(), err.to_string())
    }

    /// Kind name for errors of type `E`: the type name without its module
    /// path or generic parameters
    ///
    /// Type-erased errors report their container (`Box`, `Error`), not the
    /// concrete error they wrap.
    pub fn kind_of<E: ?Sized>() -> String {
        let full = std::any::type_name::<E>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_string()
    }

    /// Error kind (type name of the captured error)
    pub fn error_kind(&self) -> &str {
        &self.error_kind
    }

    /// Error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// When the failure was recorded (UTC)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Encode to the JSON wire format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the JSON wire format
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidRecord(e.to_string()))
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] - {}", self.error_kind, self.message)
    }
}

/// RFC 3339 timestamps on write; RFC 3339 or `YYYY-MM-DD HH:MM:SS <zone>` on read
mod wire_timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S UTC")
            .map(|naive| naive.and_utc())
            .map_err(|_| format!("unrecognised timestamp: {raw:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug)]
    struct RemoteUnavailable;

    impl fmt::Display for RemoteUnavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Remote system unavailable")
        }
    }

    #[test]
    fn test_records_utc_time() {
        let before = Utc::now();
        let failure = FailureRecord::new("Timeout", "slow");
        assert!(failure.timestamp() >= before);
        assert!(failure.timestamp() <= Utc::now());
    }

    #[test]
    fn test_display() {
        let failure = FailureRecord::from_error(&RemoteUnavailable);
        assert_eq!(failure.to_string(), "[RemoteUnavailable] - Remote system unavailable");
    }

    #[test]
    fn test_kind_strips_path_and_generics() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(FailureRecord::from_error(&io).error_kind(), "Error");
        assert_eq!(FailureRecord::kind_of::<Vec<u8>>(), "Vec");
        assert_eq!(FailureRecord::kind_of::<str>(), "str");
    }

    #[test]
    fn test_wire_field_names() {
        let ts = Utc.with_ymd_and_hms(2017, 2, 13, 23, 31, 31).unwrap();
        let failure = FailureRecord::with_timestamp("StandardError", "nope", ts);

        let value: serde_json::Value = serde_json::from_str(&failure.to_json().unwrap()).unwrap();
        assert_eq!(value["error"], "StandardError");
        assert_eq!(value["message"], "nope");
        assert_eq!(value["timestamp"], "2017-02-13T23:31:31Z");
    }

    #[test]
    fn test_decode_preserves_instant_and_rendering() {
        let failure = FailureRecord::new("Timeout", "upstream took too long");

        let decoded = FailureRecord::from_json(&failure.to_json().unwrap()).unwrap();

        assert_eq!(decoded.timestamp(), failure.timestamp());
        assert_eq!(decoded.to_string(), failure.to_string());
        assert_eq!(decoded, failure);
    }

    #[test]
    fn test_decode_legacy_timestamps() {
        let expected = Utc.with_ymd_and_hms(2017, 2, 13, 23, 31, 31).unwrap();

        let utc = r#"{"error":"StandardError","message":"m","timestamp":"2017-02-13 23:31:31 UTC"}"#;
        assert_eq!(FailureRecord::from_json(utc).unwrap().timestamp(), expected);

        let offset = r#"{"error":"StandardError","message":"m","timestamp":"2017-02-13 18:31:31 -0500"}"#;
        assert_eq!(FailureRecord::from_json(offset).unwrap().timestamp(), expected);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            FailureRecord::from_json("not json"),
            Err(Error::InvalidRecord(_))
        ));
        let bad_ts = r#"{"error":"E","message":"m","timestamp":"yesterday"}"#;
        assert!(matches!(
            FailureRecord::from_json(bad_ts),
            Err(Error::InvalidRecord(_))
        ));
    }
}
