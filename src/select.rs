// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Nearest upcoming rise/set event per body.
//!
//! At most four candidates exist per body (rise and set, today and tomorrow),
//! so the selection is a plain linear scan. The scan runs tomorrow first,
//! then today, checking rise before set within each day, and keeps any
//! candidate that is not later than the current best. The last equal value
//! seen therefore wins: today beats tomorrow, and set beats rise.

use crate::record::{Body, DailyRecord, Day, Direction};
use crate::span;
use chrono::{DateTime, FixedOffset};
use qtty::Seconds;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How far past tomorrow's midnight the scan seeds its "best so far" value.
/// Candidates beyond it never win.
pub const SCAN_HORIZON: Seconds = Seconds::new(100_000.0);

/// The next rise or set of one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NextEvent {
    pub body: Body,
    pub direction: Direction,
    pub day: Day,
    pub at: DateTime<FixedOffset>,
}

impl NextEvent {
    /// A body whose next event is a set is currently above the horizon.
    #[inline]
    pub fn risen(&self) -> bool {
        self.direction == Direction::Set
    }
}

/// Earliest event of `body` at or after `now` across both records.
///
/// Returns `None` when every candidate is absent or already past, which is
/// normal in polar day or night.
pub fn next_event(
    today: &DailyRecord,
    tomorrow: &DailyRecord,
    body: Body,
    now: DateTime<FixedOffset>,
) -> Option<NextEvent> {
    let horizon = tomorrow.midnight() + span::to_delta(SCAN_HORIZON);
    let mut best: Option<NextEvent> = None;

    for (day, record) in [(Day::Tomorrow, tomorrow), (Day::Today, today)] {
        for direction in [Direction::Rise, Direction::Set] {
            let Some(at) = record.event(body, direction) else {
                continue;
            };
            let bound = best.map_or(horizon, |b| b.at);
            if at >= now && at <= bound {
                best = Some(NextEvent {
                    body,
                    direction,
                    day,
                    at,
                });
            }
        }
    }

    best
}
