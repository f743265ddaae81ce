//! Kubernetes-style durations
//!
//! Provider configs carry durations as strings (`"24h"`, `"1h30m"`,
//! `"90s"`). [`Duration`] parses them with `humantime` and serializes back
//! to the canonical Kubernetes rendering (`"24h0m0s"`, `"1h30m0s"`, `"1m30s"`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Error parsing a duration string.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid duration {input:?}: {source}")]
pub struct DurationParseError {
    /// Full input
    pub input: String,
    /// Underlying parse failure
    #[source]
    pub source: humantime::DurationError,
}

/// Non-negative duration with Kubernetes string encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub StdDuration);

impl Duration {
    /// Zero duration.
    pub const ZERO: Duration = Duration(StdDuration::ZERO);

    /// Duration of `hours` hours.
    #[must_use]
    pub const fn from_hours(hours: u64) -> Self {
        Self(StdDuration::from_secs(hours * 3600))
    }

    /// Duration of `secs` seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(StdDuration::from_secs(secs))
    }

    /// The underlying std duration.
    #[must_use]
    pub const fn as_std(&self) -> StdDuration {
        self.0
    }
}

impl From<StdDuration> for Duration {
    fn from(value: StdDuration) -> Self {
        Self(value)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        // Kubernetes accepts a bare zero without unit
        if trimmed == "0" {
            return Ok(Self::ZERO);
        }
        humantime::parse_duration(trimmed)
            .map(Duration)
            .map_err(|source| DurationParseError {
                input: input.to_string(),
                source,
            })
    }
}

fn format_fraction(value: u128, divisor: u128, width: usize) -> String {
    let int = value / divisor;
    let frac = value % divisor;
    if frac == 0 {
        return int.to_string();
    }
    let digits = format!("{frac:0width$}");
    format!("{int}.{}", digits.trim_end_matches('0'))
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }
        if nanos < NANOS_PER_SECOND {
            let (unit, divisor, width) = if nanos < 1_000 {
                ("ns", 1, 0)
            } else if nanos < 1_000_000 {
                ("µs", 1_000, 3)
            } else {
                ("ms", 1_000_000, 6)
            };
            return write!(f, "{}{unit}", format_fraction(nanos, divisor, width));
        }

        let secs = self.0.as_secs();
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = u128::from(secs % 60) * NANOS_PER_SECOND + u128::from(self.0.subsec_nanos());

        let mut rendered = String::new();
        if hours > 0 {
            rendered.push_str(&format!("{hours}h"));
        }
        if hours > 0 || minutes > 0 {
            rendered.push_str(&format!("{minutes}m"));
        }
        rendered.push_str(&format_fraction(seconds, NANOS_PER_SECOND, 9));
        rendered.push('s');
        f.write_str(&rendered)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::*;

    fn parse(input: &str) -> Duration {
        input.parse().unwrap()
    }

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse("24h"), Duration::from_hours(24));
        assert_eq!(parse("90s"), Duration::from_secs(90));
        assert_eq!(parse("1h30m"), Duration::from_secs(5400));
        assert_eq!(parse("24h0m0s"), Duration::from_hours(24));
        assert_eq!(parse("0"), Duration::ZERO);
        assert_eq!(parse("300ms"), Duration(StdDuration::from_millis(300)));
        assert_eq!(parse("2us"), Duration(StdDuration::from_micros(2)));
    }

    #[test]
    fn test_parse_errors() {
        for input in ["", "10", "-1h", "h", "forever"] {
            let err = input.parse::<Duration>().unwrap_err();
            assert_eq!(err.input, input);
            assert!(err.to_string().starts_with("invalid duration"));
        }
    }

    #[test]
    fn test_display_canonical_form() {
        assert_eq!(Duration::from_hours(24).to_string(), "24h0m0s");
        assert_eq!(Duration::from_hours(23).to_string(), "23h0m0s");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
        assert_eq!(Duration::from_secs(5).to_string(), "5s");
        assert_eq!(Duration::ZERO.to_string(), "0s");
        assert_eq!(Duration(StdDuration::from_millis(1500)).to_string(), "1.5s");
        assert_eq!(Duration(StdDuration::from_micros(1500)).to_string(), "1.5ms");
        assert_eq!(Duration(StdDuration::from_nanos(42)).to_string(), "42ns");
    }

    #[test]
    fn test_serde_string_encoding() {
        let value: Duration = serde_json::from_str("\"48h\"").unwrap();
        assert_eq!(value, Duration::from_hours(48));
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"48h0m0s\"");
        assert!(serde_json::from_str::<Duration>("\"forever\"").is_err());
    }
}
