//! Common types and utilities shared across domain models

use chrono::{LocalResult, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp in whole seconds since Unix epoch.
///
/// The canonical form deliberately carries no sub-second component; two
/// records added within the same second compare equal and fall back to
/// store-insertion order when sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp for the current moment, truncated to seconds
    ///
    /// # Safety
    /// If system time is somehow before UNIX_EPOCH (should never happen),
    /// gracefully falls back to timestamp 0 instead of panicking.
    pub fn now() -> Self {
        Self(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_else(|_| std::time::Duration::from_secs(0))
                .as_secs() as i64,
        )
    }

    /// Creates a timestamp from seconds since Unix epoch
    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the timestamp as seconds since Unix epoch
    pub fn as_seconds(&self) -> i64 {
        self.0
    }

    /// Formats as `YYYY-MM-DD HH:MM` (UTC) for table display
    pub fn format_display(&self) -> String {
        match Utc.timestamp_opt(self.0, 0) {
            LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            _ => self.0.to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_display())
    }
}

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_has_no_subseconds() {
        let t = Timestamp::now();
        // now() already truncates; round-tripping through seconds is lossless
        assert_eq!(Timestamp::from_seconds(t.as_seconds()), t);
    }

    #[test]
    fn test_timestamp_from_seconds() {
        let t = Timestamp::from_seconds(1_700_000_000);
        assert_eq!(t.as_seconds(), 1_700_000_000);
    }

    #[test]
    fn test_timestamp_ordering() {
        let t1 = Timestamp::from_seconds(1000);
        let t2 = Timestamp::from_seconds(2000);
        assert!(t1 < t2);
    }

    #[test]
    fn test_timestamp_display_format() {
        let t = Timestamp::from_seconds(0);
        assert_eq!(t.to_string(), "1970-01-01 00:00");
    }

    #[test]
    fn test_timestamp_equal_within_second() {
        let t1 = Timestamp::from_seconds(1_700_000_000);
        let t2 = Timestamp::from_seconds(1_700_000_000);
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_validator_trait() {
        struct Positive(i32);

        impl Validator for Positive {
            fn validate(&self) -> Result<(), Vec<String>> {
                if self.0 < 0 {
                    Err(vec!["Value must be positive".to_string()])
                } else {
                    Ok(())
                }
            }
        }

        assert!(Positive(1).is_valid());
        assert!(!Positive(-1).is_valid());
    }
}
