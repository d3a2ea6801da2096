use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Creation time of a completion.
///
/// Providers disagree on the wire format: OpenAI sends UNIX seconds, some
/// compatible gateways send RFC 3339 strings. Both deserialize here; the
/// value always serializes back as UNIX seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(
    /// Instant in UTC
    DateTime<Utc>,
);

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        /// Accepts integer seconds or an RFC 3339 string
        struct TimestampVisitor;

        impl de::Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a UNIX timestamp (int) or RFC 3339 string")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Timestamp::from_unix_seconds(value)
                    .ok_or_else(|| E::custom(format!("timestamp out of range: {value}")))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .ok()
                    .and_then(Timestamp::from_unix_seconds)
                    .ok_or_else(|| E::custom(format!("timestamp out of range: {value}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                DateTime::parse_from_rfc3339(value)
                    .map(|dt| Timestamp(dt.with_timezone(&Utc)))
                    .map_err(|err| E::custom(format!("invalid RFC 3339 timestamp: {err}")))
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0.timestamp())
    }
}

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// `None` when the value is outside chrono's representable range
    #[must_use]
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    #[must_use]
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    #[must_use]
    pub fn inner(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;

    #[test]
    fn deserializes_from_integer_seconds() {
        let ts: Timestamp = serde_json::from_str("1758887156").expect("integer timestamps should parse");
        assert_eq!(ts.unix_seconds(), 1_758_887_156);
    }

    #[test]
    fn deserializes_from_rfc3339_string() {
        let ts: Timestamp =
            serde_json::from_str("\"2025-09-26T11:45:56Z\"").expect("RFC3339 string should parse");
        assert_eq!(ts.unix_seconds(), 1_758_887_156);
    }

    #[test]
    fn serializes_as_unix_seconds() {
        let ts = Timestamp::from_unix_seconds(1_700_000_000).unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000");
    }
}
