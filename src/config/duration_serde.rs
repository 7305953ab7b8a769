//! Serde helpers for human-readable durations in configuration.
//!
//! Accepts either a bare number of seconds or a humantime string such as
//! `"5s"`, `"1500ms"` or `"1m30s"`. Always serializes as a humantime string.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let duration_str = humantime::format_duration(*duration).to_string();
    serializer.serialize_str(&duration_str)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a duration as seconds (number) or human-readable string (e.g., '5s', '1500ms')")
        }

        fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(seconds))
        }

        fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(seconds)
                .map(Duration::from_secs)
                .map_err(|_| de::Error::custom(format!("Negative duration: {seconds}")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(value.trim())
                .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        timeout: Duration,
    }

    #[test]
    fn accepts_seconds_and_humantime() {
        let from_number: Holder = toml::from_str("timeout = 7").unwrap();
        assert_eq!(from_number.timeout, Duration::from_secs(7));

        let from_string: Holder = toml::from_str("timeout = \"1500ms\"").unwrap();
        assert_eq!(from_string.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn rejects_garbage() {
        assert!(toml::from_str::<Holder>("timeout = \"soon\"").is_err());
    }

    #[test]
    fn serializes_as_humantime() {
        let holder = Holder {
            timeout: Duration::from_secs(5),
        };
        assert_eq!(toml::to_string(&holder).unwrap().trim(), "timeout = \"5s\"");
    }
}
