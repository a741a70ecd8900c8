//! Timeout tiers for network operations.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounds for the three kinds of network work the manager performs.
///
/// Serialized as seconds (fractions allowed), e.g.
/// `{"dial": 10, "health": 5, "query": 30}`. Missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "seconds")]
    pub dial: Duration,
    #[serde(with = "seconds")]
    pub health: Duration,
    #[serde(with = "seconds")]
    pub query: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            dial: DEFAULT_DIAL_TIMEOUT,
            health: DEFAULT_HEALTH_TIMEOUT,
            query: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl Timeouts {
    /// The same bound for every tier. Handy in tests.
    pub fn uniform(limit: Duration) -> Self {
        Self {
            dial: limit,
            health: limit,
            query: limit,
        }
    }
}

mod seconds {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_defaults() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.dial, Duration::from_secs(10));
        assert_eq!(timeouts.health, Duration::from_secs(5));
        assert_eq!(timeouts.query, Duration::from_secs(30));
    }

    #[rstest]
    fn test_partial_override() {
        let timeouts: Timeouts = serde_json::from_str(r#"{"query": 2.5}"#).unwrap();
        assert_eq!(timeouts.query, Duration::from_millis(2500));
        assert_eq!(timeouts.dial, DEFAULT_DIAL_TIMEOUT);
    }

    #[rstest]
    fn test_negative_rejected() {
        let result: Result<Timeouts, _> = serde_json::from_str(r#"{"dial": -1}"#);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_serializes_as_seconds() {
        let json = serde_json::to_value(Timeouts::default()).unwrap();
        assert_eq!(json["health"], serde_json::json!(5.0));
    }
}
