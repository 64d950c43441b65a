//! Microsecond timestamps.
//!
//! Trajectory points and dispatch queries share one time base: signed
//! microseconds since the Unix epoch. Signed so a query may legitimately
//! fall before the first point of a trajectory.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Point in time, microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The epoch itself.
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_micros(us: i64) -> Self {
        Self(us)
    }

    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms * 1_000)
    }

    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Current wall-clock time.
    ///
    /// Clocks set before 1970 read as [`Timestamp::ZERO`].
    pub fn now() -> Self {
        let us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self(us)
    }

    /// Signed distance `self - earlier` in seconds.
    #[inline]
    pub fn seconds_since(self, earlier: Self) -> f32 {
        (self.0 - earlier.0) as f32 * 1e-6
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        let us = i64::try_from(rhs.as_micros()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(us))
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self {
        let us = i64::try_from(rhs.as_micros()).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(us))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}us", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_and_micros_agree() {
        assert_eq!(Timestamp::from_millis(1500), Timestamp::from_micros(1_500_000));
        assert_eq!(Timestamp::from_millis(-100).as_micros(), -100_000);
    }

    #[test]
    fn duration_arithmetic() {
        let t = Timestamp::from_millis(10);
        assert_eq!(t + Duration::from_millis(5), Timestamp::from_millis(15));
        assert_eq!(t - Duration::from_millis(20), Timestamp::from_millis(-10));
    }

    #[test]
    fn seconds_since_is_signed() {
        let a = Timestamp::from_millis(250);
        let b = Timestamp::from_millis(1000);
        assert!((b.seconds_since(a) - 0.75).abs() < 1e-6);
        assert!((a.seconds_since(b) + 0.75).abs() < 1e-6);
    }

    #[test]
    fn display_in_micros() {
        assert_eq!(Timestamp::from_millis(-3).to_string(), "-3000us");
    }

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(Timestamp::now() > Timestamp::from_micros(1_577_836_800_000_000));
    }
}
