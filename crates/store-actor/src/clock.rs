//! # Write Clock
//!
//! Source of the `updated_at` stamps the store assigns to every write.
//!
//! Snapshot ordering and conditional writes both compare stamps, so two
//! writes must never share one. Wall-clock reads can repeat (coarse clock
//! granularity, NTP steps), which is why the clock remembers the last stamp
//! it handed out and nudges forward when the OS clock has not moved.

use chrono::{DateTime, Duration, Utc};

/// Hands out strictly increasing `DateTime<Utc>` write stamps.
///
/// Owned by a single `StoreActor`, so stamps are totally ordered per store.
/// Stamps track wall-clock time except when consecutive writes land within
/// the clock's resolution, in which case the later stamp is the earlier one
/// plus one microsecond.
pub struct WriteClock {
    last: DateTime<Utc>,
}

impl WriteClock {
    pub fn new() -> Self {
        Self {
            last: DateTime::<Utc>::MIN_UTC,
        }
    }

    /// Returns the stamp for the next write.
    pub fn next(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = if now > self.last {
            now
        } else {
            self.last + Duration::microseconds(1)
        };
        self.last = stamp;
        stamp
    }
}

impl Default for WriteClock {
    fn default() -> Self {
        Self::new()
    }
}
