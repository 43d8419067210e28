// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! When to resynchronise the wall clock.
//!
//! The on-board clock drifts, so it is periodically corrected against a time
//! server. A failed attempt is not an error for the clock face: it keeps
//! running on local time while `last_sync` is pushed forward by a backoff
//! shorter than the sync interval, so the next attempt comes sooner than a
//! full interval later.

use crate::error::EngineError;
use crate::span;
use chrono::{DateTime, FixedOffset};
use qtty::Seconds;

/// Tracks the last sync and decides when the next one is due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSyncScheduler {
    last_sync: DateTime<FixedOffset>,
    interval: Seconds,
    backoff: Seconds,
}

impl ClockSyncScheduler {
    /// Fails unless `0 < backoff < interval`.
    pub fn new(
        last_sync: DateTime<FixedOffset>,
        interval: Seconds,
        backoff: Seconds,
    ) -> Result<Self, EngineError> {
        if !(backoff > Seconds::new(0.0) && backoff < interval) {
            return Err(EngineError::InvalidConfig(format!(
                "sync backoff {backoff} must be positive and shorter than the interval {interval}"
            )));
        }
        Ok(Self {
            last_sync,
            interval,
            backoff,
        })
    }

    #[inline]
    pub fn last_sync(&self) -> DateTime<FixedOffset> {
        self.last_sync
    }

    #[inline]
    pub fn interval(&self) -> Seconds {
        self.interval
    }

    #[inline]
    pub fn backoff(&self) -> Seconds {
        self.backoff
    }

    /// True once strictly more than one interval has passed since the last
    /// sync.
    pub fn due(&self, now: DateTime<FixedOffset>) -> bool {
        span::between(self.last_sync, now) > self.interval
    }

    /// Earliest instant at which [`due`](Self::due) can turn true.
    pub fn next_due(&self) -> DateTime<FixedOffset> {
        self.last_sync + span::to_delta(self.interval)
    }

    /// Record a successful sync. `synced_now` must be the time reported
    /// *after* the sync, not the instant the attempt started.
    pub fn record_success(&mut self, synced_now: DateTime<FixedOffset>) {
        self.last_sync = synced_now;
    }

    /// Record a failed sync by moving `last_sync` forward by the backoff.
    pub fn record_failure(&mut self) {
        self.last_sync += span::to_delta(self.backoff);
    }
}
