//! Reaction cycle bookkeeping for a venue

use chrono::{DateTime, Duration, Utc};

/// Reset schedule of a venue's reaction counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Incremented by every reset
    pub generation: u64,
    pub last_reset_at: Option<DateTime<Utc>>,
    pub next_reset_at: DateTime<Utc>,
    /// Set by a reset until every stale user record has been removed
    pub cleanup_pending: bool,
}

impl Cycle {
    /// First cycle of a venue, starting at `now`
    pub fn starting_at(now: DateTime<Utc>, length: Duration) -> Self {
        Self {
            generation: 0,
            last_reset_at: None,
            next_reset_at: now + length,
            cleanup_pending: false,
        }
    }

    #[inline]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_reset_at <= now
    }

    /// Cycle that follows a reset performed at `now`.
    ///
    /// `next_reset_at` moves forward by whole cycle lengths until it is strictly
    /// after `now`, so a late reset keeps the original cadence. Lengths below one
    /// millisecond count as one millisecond.
    pub fn advanced(&self, now: DateTime<Utc>, length: Duration) -> Self {
        let step = length.num_milliseconds().max(1);
        let behind = (now - self.next_reset_at).num_milliseconds().max(0);
        let skips = behind / step + 1;
        let next = self.next_reset_at + Duration::milliseconds(step.saturating_mul(skips));
        Self {
            generation: self.generation + 1,
            last_reset_at: Some(now),
            next_reset_at: next,
            cleanup_pending: true,
        }
    }
}
