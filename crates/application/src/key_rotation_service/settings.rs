use std::time::Duration;

use tracing::warn;

/// Key lifetime applied when no valid setting is configured (365 days).
pub const DEFAULT_EXPIRE_IN_SECONDS: i64 = 60 * 60 * 24 * 365;

/// Delay before touching an app so console edits in flight can settle.
pub const DEFAULT_SETTLE_DELAY_SECONDS: u64 = 5;

/// Tunables for key rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSettings {
    expire_in_seconds: i64,
    settle_delay: Duration,
}

impl RotationSettings {
    /// Creates settings from already validated values.
    ///
    /// Non-positive lifetimes fall back to [`DEFAULT_EXPIRE_IN_SECONDS`].
    #[must_use]
    pub fn new(expire_in_seconds: i64, settle_delay: Duration) -> Self {
        Self {
            expire_in_seconds: if expire_in_seconds > 0 {
                expire_in_seconds
            } else {
                DEFAULT_EXPIRE_IN_SECONDS
            },
            settle_delay,
        }
    }

    /// Creates settings from the raw `EXPIRE_IN_SECONDS` value.
    ///
    /// Missing, non-numeric or non-positive values fall back to
    /// [`DEFAULT_EXPIRE_IN_SECONDS`]; only a set but invalid value is logged.
    #[must_use]
    pub fn from_raw_expire_in_seconds(raw: Option<&str>, settle_delay: Duration) -> Self {
        let parsed = raw
            .map(str::trim)
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|value| *value > 0);

        let expire_in_seconds = match parsed {
            Some(value) => value,
            None if raw.is_none() => DEFAULT_EXPIRE_IN_SECONDS,
            None => {
                warn!(
                    raw_value = raw.unwrap_or_default(),
                    default_seconds = DEFAULT_EXPIRE_IN_SECONDS,
                    "could not parse EXPIRE_IN_SECONDS as a positive integer, using default"
                );
                DEFAULT_EXPIRE_IN_SECONDS
            }
        };

        Self::new(expire_in_seconds, settle_delay)
    }

    /// Returns the lifetime given to recreated keys.
    #[must_use]
    pub fn expire_in_seconds(&self) -> i64 {
        self.expire_in_seconds
    }

    /// Returns the delay applied before rotation starts.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXPIRE_IN_SECONDS,
            Duration::from_secs(DEFAULT_SETTLE_DELAY_SECONDS),
        )
    }
}
