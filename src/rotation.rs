// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Round-robin over the eight rise/set display slots.
//!
//! The clock face has room for one event at a time, so each refresh shows
//! the next slot in a fixed cycle:
//!
//! | State | Slot |
//! |-------|------|
//! | 8 | sunrise today |
//! | 7 | sunset today |
//! | 6 | moonrise today |
//! | 5 | moonset today |
//! | 4 | sunrise tomorrow |
//! | 3 | sunset tomorrow |
//! | 2 | moonrise tomorrow |
//! | 1 | moonset tomorrow |
//!
//! The cycle starts at 8 and counts down, wrapping from 1 back to 8. Slots
//! whose event is missing produce nothing for that tick, but still use up
//! their turn.

use crate::record::{Body, Day, Direction};
use crate::window::EventWindow;
use chrono::{DateTime, FixedOffset};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the eight display slots, numbered as in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Slot {
    TodaySunrise = 8,
    TodaySunset = 7,
    TodayMoonrise = 6,
    TodayMoonset = 5,
    TomorrowSunrise = 4,
    TomorrowSunset = 3,
    TomorrowMoonrise = 2,
    TomorrowMoonset = 1,
}

impl Slot {
    /// All slots in presentation order.
    pub const CYCLE: [Slot; 8] = [
        Slot::TodaySunrise,
        Slot::TodaySunset,
        Slot::TodayMoonrise,
        Slot::TodayMoonset,
        Slot::TomorrowSunrise,
        Slot::TomorrowSunset,
        Slot::TomorrowMoonrise,
        Slot::TomorrowMoonset,
    ];

    /// State number in `1..=8`.
    #[inline]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// The slot shown after this one.
    pub const fn next(self) -> Slot {
        match self {
            Slot::TodaySunrise => Slot::TodaySunset,
            Slot::TodaySunset => Slot::TodayMoonrise,
            Slot::TodayMoonrise => Slot::TodayMoonset,
            Slot::TodayMoonset => Slot::TomorrowSunrise,
            Slot::TomorrowSunrise => Slot::TomorrowSunset,
            Slot::TomorrowSunset => Slot::TomorrowMoonrise,
            Slot::TomorrowMoonrise => Slot::TomorrowMoonset,
            Slot::TomorrowMoonset => Slot::TodaySunrise,
        }
    }

    pub const fn body(self) -> Body {
        match self {
            Slot::TodaySunrise
            | Slot::TodaySunset
            | Slot::TomorrowSunrise
            | Slot::TomorrowSunset => Body::Sun,
            Slot::TodayMoonrise
            | Slot::TodayMoonset
            | Slot::TomorrowMoonrise
            | Slot::TomorrowMoonset => Body::Moon,
        }
    }

    pub const fn direction(self) -> Direction {
        match self {
            Slot::TodaySunrise
            | Slot::TodayMoonrise
            | Slot::TomorrowSunrise
            | Slot::TomorrowMoonrise => Direction::Rise,
            Slot::TodaySunset
            | Slot::TodayMoonset
            | Slot::TomorrowSunset
            | Slot::TomorrowMoonset => Direction::Set,
        }
    }

    pub const fn day(self) -> Day {
        match self {
            Slot::TodaySunrise | Slot::TodaySunset | Slot::TodayMoonrise | Slot::TodayMoonset => {
                Day::Today
            }
            Slot::TomorrowSunrise
            | Slot::TomorrowSunset
            | Slot::TomorrowMoonrise
            | Slot::TomorrowMoonset => Day::Tomorrow,
        }
    }

    /// Arrow shown next to the event.
    pub const fn glyph(self) -> Glyph {
        match (self.day(), self.direction()) {
            (Day::Today, Direction::Rise) => Glyph::RiseToday,
            (Day::Today, Direction::Set) => Glyph::SetToday,
            (Day::Tomorrow, Direction::Rise) => Glyph::RiseTomorrow,
            (Day::Tomorrow, Direction::Set) => Glyph::SetTomorrow,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (self.body(), self.direction()) {
            (Body::Sun, Direction::Rise) => "Sunrise",
            (Body::Sun, Direction::Set) => "Sunset",
            (Body::Moon, Direction::Rise) => "Moonrise",
            (Body::Moon, Direction::Set) => "Moonset",
        };
        write!(f, "{name} {}", self.day())
    }
}

/// Directional arrow for an event; double-headed arrows mark tomorrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Glyph {
    RiseToday,
    SetToday,
    RiseTomorrow,
    SetTomorrow,
}

impl Glyph {
    pub const fn as_char(self) -> char {
        match self {
            Glyph::RiseToday => '\u{2191}',
            Glyph::SetToday => '\u{2193}',
            Glyph::RiseTomorrow => '\u{219F}',
            Glyph::SetTomorrow => '\u{21A1}',
        }
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Event picked by the rotation for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotEvent {
    pub slot: Slot,
    pub at: DateTime<FixedOffset>,
}

impl SlotEvent {
    #[inline]
    pub fn body(&self) -> Body {
        self.slot.body()
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.slot.direction()
    }

    #[inline]
    pub fn glyph(&self) -> Glyph {
        self.slot.glyph()
    }
}

/// Rotation state; starts at [`Slot::TodaySunrise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRotationCycle {
    current: Slot,
}

impl Default for EventRotationCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRotationCycle {
    pub const fn new() -> Self {
        Self {
            current: Slot::TodaySunrise,
        }
    }

    /// Slot that the next call to [`advance`](Self::advance) will show.
    #[inline]
    pub const fn current(&self) -> Slot {
        self.current
    }

    /// Emit the current slot's event from `window` and move to the next
    /// slot. Returns `None` when the record has no such event; the cycle
    /// moves on either way.
    pub fn advance(&mut self, window: &EventWindow) -> Option<SlotEvent> {
        let slot = self.current;
        self.current = slot.next();
        window
            .record(slot.day())
            .event(slot.body(), slot.direction())
            .map(|at| SlotEvent { slot, at })
    }
}
