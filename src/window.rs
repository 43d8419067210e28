// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The rolling two-day window.
//!
//! An [`EventWindow`] owns a `[today, tomorrow]` pair of [`DailyRecord`]s.
//! Everything the clock face shows is derived from this pair: the phase is
//! interpolated between the two midnights and the next rise/set is picked
//! from the (up to) eight events they hold.
//!
//! The window only changes through [`EventWindow::advance_if_expired`], which
//! shifts `tomorrow` into `today` and fetches a fresh `tomorrow` once the
//! current time reaches tomorrow's midnight.

use crate::error::{EngineError, FetchError};
use crate::phase::MoonPhase;
use crate::record::{Body, DailyRecord, Day};
use crate::select::{self, NextEvent};
use crate::span::{self, SECONDS_PER_DAY};
use chrono::{DateTime, Days as CalendarDays, FixedOffset, NaiveDate};
use qtty::Seconds;
use tracing::{info, warn};

/// Two consecutive daily records, ordered `[today, tomorrow]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventWindow {
    today: DailyRecord,
    tomorrow: DailyRecord,
}

impl EventWindow {
    /// Pair two records.
    ///
    /// Fails unless `tomorrow` starts strictly after `today`. A span other
    /// than 24 h (DST changes) is accepted but logged.
    pub fn new(today: DailyRecord, tomorrow: DailyRecord) -> Result<Self, EngineError> {
        if tomorrow.midnight() <= today.midnight() {
            return Err(EngineError::InvalidWindow {
                today: today.midnight(),
                tomorrow: tomorrow.midnight(),
            });
        }
        let window = Self { today, tomorrow };
        if window.span() != SECONDS_PER_DAY {
            warn!(
                today = %today.midnight(),
                tomorrow = %tomorrow.midnight(),
                "window does not span exactly one day"
            );
        }
        Ok(window)
    }

    #[inline]
    pub fn today(&self) -> &DailyRecord {
        &self.today
    }

    #[inline]
    pub fn tomorrow(&self) -> &DailyRecord {
        &self.tomorrow
    }

    /// The record for one half of the window.
    #[inline]
    pub fn record(&self, day: Day) -> &DailyRecord {
        match day {
            Day::Today => &self.today,
            Day::Tomorrow => &self.tomorrow,
        }
    }

    /// Time between the two midnights.
    #[inline]
    pub fn span(&self) -> Seconds {
        span::between(self.today.midnight(), self.tomorrow.midnight())
    }

    /// Fraction of the current period elapsed at `now`.
    ///
    /// Not clamped: instants before today's midnight give negative values and
    /// instants past tomorrow's midnight give values of 1 or more.
    pub fn ratio(&self, now: DateTime<FixedOffset>) -> f64 {
        let elapsed = span::between(self.today.midnight(), now);
        elapsed.value() / self.span().value()
    }

    /// Interpolated moon phase at `now`.
    pub fn phase(&self, now: DateTime<FixedOffset>) -> MoonPhase {
        MoonPhase::interpolate(self.today.age(), self.tomorrow.age(), self.ratio(now))
    }

    /// Next rise or set of `body` at or after `now`.
    pub fn next_event(&self, body: Body, now: DateTime<FixedOffset>) -> Option<NextEvent> {
        select::next_event(&self.today, &self.tomorrow, body, now)
    }

    /// Whether `now` has reached tomorrow's midnight (inclusive).
    #[inline]
    pub fn is_expired(&self, now: DateTime<FixedOffset>) -> bool {
        now >= self.tomorrow.midnight()
    }

    /// Calendar date of the record a rollover would fetch next.
    pub fn following_date(&self) -> Option<NaiveDate> {
        self.tomorrow
            .date()
            .checked_add_days(CalendarDays::new(1))
    }

    /// Roll the window forward until `now` is before tomorrow's midnight.
    ///
    /// For each step, `fetch` is asked for the day after the current
    /// `tomorrow`; only once it succeeds does the window shift. Returns the
    /// number of steps taken (0 when the window was still current).
    ///
    /// On failure the window is left exactly as it was and a fatal
    /// [`EngineError::RolloverFailed`] is returned.
    pub fn advance_if_expired<F>(
        &mut self,
        now: DateTime<FixedOffset>,
        mut fetch: F,
    ) -> Result<u32, EngineError>
    where
        F: FnMut(NaiveDate) -> Result<DailyRecord, FetchError>,
    {
        let mut steps = 0;
        while self.is_expired(now) {
            let expired_at = self.tomorrow.midnight();
            let fail = |cause: EngineError| EngineError::RolloverFailed {
                expired_at,
                cause: Box::new(cause),
            };

            let date = self.following_date().ok_or_else(|| {
                fail(EngineError::InvalidRecord(format!(
                    "no calendar day after {}",
                    self.tomorrow.date()
                )))
            })?;
            let fresh = fetch(date).map_err(|e| fail(e.into()))?;
            let next = EventWindow::new(self.tomorrow, fresh).map_err(fail)?;

            *self = next;
            steps += 1;
            info!(
                today = %self.today.date(),
                tomorrow = %self.tomorrow.date(),
                "window rolled over"
            );
        }
        Ok(steps)
    }
}
