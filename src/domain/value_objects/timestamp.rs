//! # Timestamp Value Object
//!
//! Millisecond-precision UTC timestamp used for quote freshness and
//! execution lifecycle tracking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in time, stored as milliseconds since the Unix epoch.
///
/// # Examples
///
/// ```
/// use swap_router::domain::value_objects::timestamp::Timestamp;
/// use std::time::Duration;
///
/// let created = Timestamp::now();
/// assert!(created.elapsed() < Duration::from_secs(1));
///
/// let later = created.add_secs(60);
/// assert!(later > created);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Returns the current time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Creates a timestamp from raw epoch milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_epoch_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the raw epoch milliseconds.
    #[inline]
    #[must_use]
    pub const fn epoch_millis(self) -> u64 {
        self.0
    }

    /// Returns a timestamp shifted forward by the given number of seconds.
    #[must_use]
    pub const fn add_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs * 1_000))
    }

    /// Returns a timestamp shifted backward by the given number of seconds.
    #[must_use]
    pub const fn sub_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs * 1_000))
    }

    /// Returns the time elapsed since this timestamp.
    ///
    /// Timestamps in the future report zero elapsed time.
    #[must_use]
    pub fn elapsed(self) -> Duration {
        let now = Self::now();
        Duration::from_millis(now.0.saturating_sub(self.0))
    }

    /// Returns true if more than `window` has passed since this timestamp.
    #[must_use]
    pub fn is_older_than(self, window: Duration) -> bool {
        self.elapsed() > window
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
