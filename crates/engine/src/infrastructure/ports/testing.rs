use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Injected everywhere a timestamp is written so tests can pin the clock
/// and assert on exact values.
#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
