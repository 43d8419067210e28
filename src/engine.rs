// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The per-tick driver.
//!
//! [`MoonClock`] owns every piece of engine state (the two-day window, the
//! rotation counter and the sync scheduler) together with the two
//! collaborators. The outer loop calls [`MoonClock::tick`] once per refresh
//! and hands the resulting [`TickReport`] to the renderer. A tick runs:
//!
//! 1. clock resync, if due (a success re-reads the time before continuing);
//! 2. window rollover, if tomorrow's midnight has been reached;
//! 3. phase interpolation;
//! 4. next-event selection for the Moon and the Sun;
//! 5. one step of the display rotation.
//!
//! A rollover whose fetch is exhausted poisons the engine: that tick and
//! every later one return the same fatal error and the process is expected
//! to restart.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::format::{event_label, format_clock, format_date};
use crate::phase::MoonPhase;
use crate::record::{Body, DailyRecord};
use crate::rotation::{EventRotationCycle, Glyph, SlotEvent};
use crate::select::NextEvent;
use crate::source::{fetch_with_retry, RecordSource, WallClock};
use crate::sync::ClockSyncScheduler;
use crate::window::EventWindow;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use tracing::{debug, error, info, warn};

/// Rotation event together with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownEvent {
    pub event: SlotEvent,
    /// Clock time or countdown, depending on configuration.
    pub label: String,
}

impl ShownEvent {
    #[inline]
    pub fn glyph(&self) -> Glyph {
        self.event.glyph()
    }
}

/// Everything the renderer needs for one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub now: DateTime<FixedOffset>,
    pub phase: MoonPhase,
    pub percent_label: String,
    pub moon: Option<NextEvent>,
    pub sun: Option<NextEvent>,
    pub shown: Option<ShownEvent>,
    pub local_time: NaiveTime,
    pub local_date: NaiveDate,
    pub time_label: String,
    pub date_label: String,
    /// Whether the face should be lit; outside waking hours the renderer
    /// shows its sleep screen.
    pub awake: bool,
}

impl TickReport {
    /// Risen state of `body`, if an upcoming event is known.
    pub fn risen(&self, body: Body) -> Option<bool> {
        match body {
            Body::Moon => self.moon.map(|e| e.risen()),
            Body::Sun => self.sun.map(|e| e.risen()),
        }
    }

    /// True when either body is currently above the horizon.
    pub fn any_risen(&self) -> bool {
        self.risen(Body::Moon).unwrap_or(false) || self.risen(Body::Sun).unwrap_or(false)
    }
}

/// The moon-clock engine.
#[derive(Debug)]
pub struct MoonClock<S, C> {
    config: EngineConfig,
    source: S,
    clock: C,
    utc_offset: FixedOffset,
    window: EventWindow,
    rotation: EventRotationCycle,
    scheduler: ClockSyncScheduler,
    poisoned: Option<EngineError>,
}

impl<S: RecordSource, C: WallClock> MoonClock<S, C> {
    /// Bring the engine up.
    ///
    /// Tries an initial clock sync (falling back to the local clock when the
    /// time server is unavailable), then fetches today's and tomorrow's
    /// records. Only the record fetches can make startup fail.
    pub fn start(config: EngineConfig, mut source: S, mut clock: C) -> Result<Self, EngineError> {
        config.validate()?;
        let mut utc_offset = config.offset()?;

        info!("setting initial clock time");
        let now = match clock.sync(config.timezone.as_deref()) {
            Ok(synced) => {
                utc_offset = synced.utc_offset;
                synced.now
            }
            Err(e) => {
                warn!(error = %e, "initial clock sync failed, using local time");
                clock.now()
            }
        };

        let scheduler =
            ClockSyncScheduler::new(now, config.sync_interval(), config.sync_backoff())?;

        let location = config.location();
        let policy = config.retry_policy();
        // Records are requested in `utc_offset`, which may differ from the
        // clock's own offset when the initial sync failed.
        let today_date = now.with_timezone(&utc_offset).date_naive();
        let tomorrow_date = today_date.succ_opt().ok_or_else(|| {
            EngineError::InvalidRecord(format!("no calendar day after {today_date}"))
        })?;

        let mut fetch = |date: NaiveDate| {
            fetch_with_retry(&mut source, date, &location, utc_offset, policy)
                .map_err(EngineError::Startup)
        };
        let today = fetch(today_date)?;
        let tomorrow = fetch(tomorrow_date)?;
        let window = EventWindow::new(today, tomorrow)?;

        info!(today = %today_date, tomorrow = %tomorrow_date, "event window ready");

        Ok(Self {
            config,
            source,
            clock,
            utc_offset,
            window,
            rotation: EventRotationCycle::new(),
            scheduler,
            poisoned: None,
        })
    }

    /// Run one refresh cycle.
    pub fn tick(&mut self) -> Result<TickReport, EngineError> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }

        let mut now = self.clock.now();
        if self.scheduler.due(now) {
            now = self.resync(now);
        }

        if let Err(err) = self.roll_window(now) {
            error!(error = %err, "event window expired and could not be refreshed");
            self.poisoned = Some(err.clone());
            return Err(err);
        }

        let phase = self.window.phase(now);
        let moon = self.window.next_event(Body::Moon, now);
        let sun = self.window.next_event(Body::Sun, now);
        let shown = self.rotation.advance(&self.window).map(|event| ShownEvent {
            label: event_label(
                event.at,
                now,
                self.config.label_mode(),
                self.config.compact_event_hours,
            ),
            event,
        });

        let shown_slot = shown.as_ref().map(|s| s.event.slot);
        debug!(
            age = phase.age,
            frame = phase.frame,
            illuminated = phase.illuminated,
            shown = ?shown_slot,
            "tick"
        );

        let local_time = now.time();
        let local_date = now.date_naive();
        Ok(TickReport {
            now,
            percent_label: phase.label(),
            phase,
            moon,
            sun,
            shown,
            local_time,
            local_date,
            time_label: format_clock(local_time, self.config.twelve_hour),
            date_label: format_date(local_date),
            awake: self.config.is_awake(now.hour()),
        })
    }

    /// Attempt a sync; returns the time the rest of the tick should use.
    fn resync(&mut self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        info!("syncing with time server");
        match self.clock.sync(self.config.timezone.as_deref()) {
            Ok(synced) => {
                self.scheduler.record_success(synced.now);
                if synced.utc_offset != self.utc_offset {
                    let (from, to) = (self.utc_offset, synced.utc_offset);
                    info!(%from, %to, "utc offset changed");
                    self.utc_offset = to;
                }
                self.clock.now()
            }
            Err(e) => {
                self.scheduler.record_failure();
                let retry_after = self.scheduler.next_due();
                warn!(error = %e, %retry_after, "clock sync failed, keeping local time");
                now
            }
        }
    }

    fn roll_window(&mut self, now: DateTime<FixedOffset>) -> Result<u32, EngineError> {
        let source = &mut self.source;
        let location = self.config.location();
        let offset = self.utc_offset;
        let policy = self.config.retry_policy();
        self.window.advance_if_expired(now, |date| {
            fetch_with_retry(&mut *source, date, &location, offset, policy)
        })
    }
}

impl<S, C> MoonClock<S, C> {
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn window(&self) -> &EventWindow {
        &self.window
    }

    #[inline]
    pub fn today(&self) -> &DailyRecord {
        self.window.today()
    }

    #[inline]
    pub fn rotation(&self) -> &EventRotationCycle {
        &self.rotation
    }

    #[inline]
    pub fn scheduler(&self) -> &ClockSyncScheduler {
        &self.scheduler
    }

    /// Offset used for record fetches; updated by every successful sync.
    #[inline]
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// The fatal error that stopped the engine, if any.
    #[inline]
    pub fn poisoned(&self) -> Option<&EngineError> {
        self.poisoned.as_ref()
    }

    /// Give the collaborators back, e.g. to reuse a network session.
    pub fn into_parts(self) -> (S, C) {
        (self.source, self.clock)
    }
}
