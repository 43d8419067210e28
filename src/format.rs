// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Display strings for the clock face.
//!
//! Layout and fonts belong to the renderer; these helpers only fix the text
//! it is handed, so that every renderer prints the same thing.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Timelike};

/// How a rise/set event is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventLabelMode {
    /// Local clock time of the event.
    #[default]
    ClockTime,
    /// Time remaining until the event.
    Countdown,
}

/// Current time as `H:MM` (12-hour) or `HH:MM` (24-hour).
///
/// In 12-hour style midnight reads `12` and afternoon hours wrap to 1–11.
///
/// ```
/// use chrono::NaiveTime;
/// use moonclock::format_clock;
///
/// let t = NaiveTime::from_hms_opt(0, 5, 0).unwrap();
/// assert_eq!(format_clock(t, true), "12:05");
/// assert_eq!(format_clock(t, false), "00:05");
/// ```
pub fn format_clock(time: NaiveTime, twelve_hour: bool) -> String {
    let hour = time.hour();
    let minute = time.minute();
    if twelve_hour {
        let h = match hour {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        format!("{h}:{minute:02}")
    } else {
        format!("{hour:02}:{minute:02}")
    }
}

/// Current date as `M/D`, without padding.
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Event time as `H:MM` in the event's own offset.
///
/// Hours run 0–23 unless `compact` is set, in which case afternoon hours
/// wrap to 1–11 so the label fits a narrow layout next to its glyph.
pub fn format_event_time(at: DateTime<FixedOffset>, compact: bool) -> String {
    let hour = at.hour();
    let hour = if compact && hour > 12 { hour - 12 } else { hour };
    format!("{hour}:{:02}", at.minute())
}

/// Time left until an event as `H:MM`; past events get a leading `-`.
pub fn format_countdown(remaining: TimeDelta) -> String {
    let sign = if remaining < TimeDelta::zero() { "-" } else { "" };
    let minutes = remaining.num_minutes().unsigned_abs();
    format!("{sign}{}:{:02}", minutes / 60, minutes % 60)
}

/// Label for an event according to `mode`.
pub fn event_label(
    at: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    mode: EventLabelMode,
    compact: bool,
) -> String {
    match mode {
        EventLabelMode::ClockTime => format_event_time(at, compact),
        EventLabelMode::Countdown => format_countdown(at.signed_duration_since(now)),
    }
}
