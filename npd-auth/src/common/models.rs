use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subtracted from a server-reported lifetime so the client gives up on a
/// token slightly before the server would reject it.
pub const EXPIRY_SAFETY_MARGIN: Duration = Duration::seconds(10);

/// A single credential value with an optional expiry instant.
///
/// A record without `expires_at` never expires. Records are immutable:
/// assigning a new credential produces a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Record for a token the server reports as valid for `seconds` more seconds.
    pub fn expiring_in(value: impl Into<String>, seconds: i64) -> Self {
        Self::expiring_in_from(value, seconds, Utc::now())
    }

    pub fn expiring_in_from(value: impl Into<String>, seconds: i64, now: DateTime<Utc>) -> Self {
        Self::expiring_at(value, now + Duration::seconds(seconds) - EXPIRY_SAFETY_MARGIN)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive_at(Utc::now())
    }

    pub fn is_alive_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

impl From<&str> for TokenRecord {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TokenRecord {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<S: Into<String>> From<(S, i64)> for TokenRecord {
    fn from((value, seconds): (S, i64)) -> Self {
        Self::expiring_in(value, seconds)
    }
}

impl<S: Into<String>> From<(S, DateTime<Utc>)> for TokenRecord {
    fn from((value, expires_at): (S, DateTime<Utc>)) -> Self {
        Self::expiring_at(value, expires_at)
    }
}

/// Persisted form of one token field. `value` is null when the field was never set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub value: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Option<&TokenRecord>> for StoredRecord {
    fn from(record: Option<&TokenRecord>) -> Self {
        match record {
            Some(record) => Self {
                value: Some(record.value.clone()),
                expires_at: record.expires_at,
            },
            None => Self::default(),
        }
    }
}

impl StoredRecord {
    pub fn to_record(&self) -> Option<TokenRecord> {
        self.value.as_ref().map(|value| TokenRecord {
            value: value.clone(),
            expires_at: self.expires_at,
        })
    }
}

/// Plain mapping of field name (`device`, `access`, `refresh`) to its stored record.
pub type TokenDump = BTreeMap<String, StoredRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_expiry_is_always_alive() {
        let record = TokenRecord::new("refresh");
        assert!(record.is_alive());
        assert!(record.is_alive_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn past_expiry_is_dead_future_expiry_is_alive() {
        let now = Utc::now();
        assert!(!TokenRecord::expiring_at("a", now - Duration::hours(1)).is_alive());
        assert!(TokenRecord::expiring_at("a", now + Duration::hours(1)).is_alive());
    }

    #[test]
    fn expiry_instant_is_exclusive() {
        let now = Utc::now();
        let record = TokenRecord::expiring_at("a", now);
        assert!(!record.is_alive_at(now));
        assert!(record.is_alive_at(now - Duration::seconds(1)));
    }

    #[test]
    fn expires_in_applies_safety_margin() {
        let now = Utc::now();
        let record = TokenRecord::expiring_in_from("a", 3600, now);
        assert_eq!(record.expires_at(), Some(now + Duration::seconds(3590)));
    }

    #[test]
    fn expires_in_from_tuple_matches_now_minus_margin() {
        let before = Utc::now();
        let record = TokenRecord::from(("a", 300_i64));
        let after = Utc::now();
        let expires_at = record.expires_at().unwrap();
        assert!(expires_at >= before + Duration::seconds(290));
        assert!(expires_at <= after + Duration::seconds(290));
    }

    #[test]
    fn short_lifetime_is_dead_immediately() {
        // Less than the safety margin left: treated as already dead.
        assert!(!TokenRecord::expiring_in("a", 5).is_alive());
    }

    #[test]
    fn stored_record_round_trip() {
        let record = TokenRecord::expiring_at("abc", Utc::now());
        let stored = StoredRecord::from(Some(&record));
        assert_eq!(stored.to_record(), Some(record));
        assert_eq!(StoredRecord::from(None).to_record(), None);
    }
}
