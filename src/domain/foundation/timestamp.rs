//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days. Saturates at the representable range.
    pub fn add_days(&self, days: i64) -> Self {
        Self(Self::offset(self.0, Duration::try_days(days), days < 0))
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(Self::offset(self.0, Duration::try_days(days).map(|d| -d), days > 0))
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    ///
    /// Saturates at the latest representable instant.
    pub fn plus_secs(&self, secs: u64) -> Self {
        let delta = i64::try_from(secs).ok().and_then(Duration::try_seconds);
        Self(Self::offset(self.0, delta, false))
    }

    fn offset(base: DateTime<Utc>, delta: Option<Duration>, backwards: bool) -> DateTime<Utc> {
        let bound = if backwards {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        delta
            .and_then(|d| base.checked_add_signed(d))
            .unwrap_or(bound)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn fixed() -> Timestamp {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Timestamp::from_datetime(dt)
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn add_days_moves_forward() {
        let ts = fixed().add_days(6);
        assert_eq!(ts.as_datetime().day(), 21);
    }

    #[test]
    fn minus_days_moves_backward() {
        let ts = fixed().minus_days(15);
        assert_eq!(ts.as_datetime().month(), 12);
        assert_eq!(ts.as_datetime().day(), 31);
    }

    #[test]
    fn plus_secs_adds_correctly() {
        let ts1 = fixed();
        let ts2 = ts1.plus_secs(60);
        assert_eq!(ts2.duration_since(&ts1), Duration::seconds(60));
    }

    #[test]
    fn ordering_helpers_agree() {
        let earlier = fixed();
        let later = earlier.plus_secs(1);

        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(earlier < later);
    }

    #[test]
    fn timestamp_serializes_to_json() {
        let json = serde_json::to_string(&fixed()).unwrap();
        assert!(json.contains("2024-01-15"));
    }

    #[test]
    fn huge_offsets_saturate_instead_of_panicking() {
        let ts = fixed();

        assert_eq!(*ts.add_days(i64::MAX).as_datetime(), DateTime::<Utc>::MAX_UTC);
        assert_eq!(*ts.add_days(5_000_000_000).as_datetime(), DateTime::<Utc>::MAX_UTC);
        assert_eq!(*ts.minus_days(i64::MAX).as_datetime(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(*ts.plus_secs(u64::MAX).as_datetime(), DateTime::<Utc>::MAX_UTC);
        assert!(ts.plus_secs(i64::MAX as u64).is_after(&ts));
    }
}
