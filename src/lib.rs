// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Moon Clock Engine
//!
//! This crate holds the logic behind a small matrix clock that shows the
//! time, the current lunar illumination and the next sun or moon rise/set.
//! Rendering, networking and the outer refresh loop live elsewhere; the
//! engine only needs something that supplies daily astronomical records and
//! something that tells the time.
//!
//! # Core types
//!
//! - [`DailyRecord`]: phase age and rise/set instants for one local day.
//! - [`EventWindow`]: the `[today, tomorrow]` pair, with rollover.
//! - [`MoonPhase`]: interpolated age, frame index and illumination.
//! - [`NextEvent`]: the nearest upcoming rise or set of one body.
//! - [`EventRotationCycle`]: round-robin over the eight display [`Slot`]s.
//! - [`ClockSyncScheduler`]: when to resync the clock, with backoff.
//! - [`MoonClock`]: owns all of the above and runs one [`tick`](MoonClock::tick)
//!   per refresh.
//!
//! # Collaborators
//!
//! | Trait | Supplies |
//! |-------|----------|
//! | [`RecordSource`] | a [`DailyRecord`] for a date and location |
//! | [`WallClock`] | the current time, and clock corrections |
//!
//! # Failure model
//!
//! Transient fetch errors are retried ([`fetch_with_retry`]). Failed clock
//! syncs only delay the next attempt. A window that expires and cannot be
//! refreshed is fatal: [`EngineError::is_fatal`] tells the caller to restart.

mod config;
mod engine;
mod error;
mod format;
mod phase;
mod record;
mod rotation;
mod select;
mod source;
pub(crate) mod span;
mod sync;
mod window;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use engine::{MoonClock, ShownEvent, TickReport};
pub use error::{EngineError, FetchError, SyncError};
pub use format::{
    event_label, format_clock, format_countdown, format_date, format_event_time, EventLabelMode,
};
pub use phase::{
    frame_index, illuminated_percent, interpolate_age, percent_label, MoonPhase, FRAME_COUNT,
    FULL_LABEL_THRESHOLD,
};
pub use record::{parse_timestamp, parse_utc_offset, Body, DailyRecord, Day, Direction};
pub use rotation::{EventRotationCycle, Glyph, Slot, SlotEvent};
pub use select::{next_event, NextEvent, SCAN_HORIZON};
pub use source::{fetch_with_retry, Location, RecordSource, RetryPolicy, SyncedTime, WallClock};
pub use sync::ClockSyncScheduler;
pub use window::EventWindow;
