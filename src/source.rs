// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Collaborators the engine depends on.
//!
//! The engine never talks to the network itself. It asks a [`RecordSource`]
//! for daily rise/set/phase data and a [`WallClock`] for the current time and
//! for clock corrections. Both are traits so the engine can be driven by
//! in-memory fakes in tests.

use crate::error::{FetchError, SyncError};
use crate::record::DailyRecord;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::time::Duration;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Observer position handed to the record source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Supplier of daily astronomical records.
pub trait RecordSource {
    /// Fetch the record for local calendar day `date` at `location`, with
    /// instants expressed in `utc_offset`.
    fn fetch_daily_record(
        &mut self,
        date: NaiveDate,
        location: &Location,
        utc_offset: FixedOffset,
    ) -> Result<DailyRecord, FetchError>;
}

/// Result of a successful clock synchronisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncedTime {
    /// Local time right after the sync.
    pub now: DateTime<FixedOffset>,
    /// Offset the time server reported; may differ after a DST change.
    pub utc_offset: FixedOffset,
}

/// Source of wall-clock time.
pub trait WallClock {
    /// Current local time.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Correct the clock against a time server. `timezone` is a zone name
    /// such as `"America/Los_Angeles"`, or `None` to let the server
    /// geolocate.
    fn sync(&mut self, timezone: Option<&str>) -> Result<SyncedTime, SyncError>;
}

/// Fixed-budget, fixed-delay retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(15),
        }
    }
}

/// Fetch a record, retrying transient failures.
///
/// Non-transient errors are returned at once. After `policy.attempts`
/// transient failures the last one is wrapped in [`FetchError::Exhausted`].
/// The thread sleeps `policy.delay` between attempts.
pub fn fetch_with_retry<S: RecordSource + ?Sized>(
    source: &mut S,
    date: NaiveDate,
    location: &Location,
    utc_offset: FixedOffset,
    policy: RetryPolicy,
) -> Result<DailyRecord, FetchError> {
    let attempts = policy.attempts.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
        match source.fetch_daily_record(date, location, utc_offset) {
            Ok(record) => return Ok(record),
            Err(FetchError::Transient(reason)) => {
                warn!(%date, attempt, attempts, %reason, "record fetch failed");
                last = reason;
                if attempt < attempts && !policy.delay.is_zero() {
                    std::thread::sleep(policy.delay);
                }
            }
            Err(other) => return Err(other),
        }
    }

    Err(FetchError::Exhausted {
        date,
        attempts,
        last,
    })
}
