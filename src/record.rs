// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! One calendar day of rise/set/phase data.
//!
//! A [`DailyRecord`] is what the data-source collaborator hands the engine
//! for a single local day starting at local midnight. Records are immutable:
//! the window replaces them wholesale and never edits a field.

use crate::error::EngineError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Celestial body whose rise/set times the engine tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Body {
    Sun,
    Moon,
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
        })
    }
}

/// Whether an event crosses the horizon upwards or downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Rise,
    Set,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Rise => "rise",
            Direction::Set => "set",
        })
    }
}

/// Which half of the two-day window a record or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Day {
    Today,
    Tomorrow,
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Day::Today => "today",
            Day::Tomorrow => "tomorrow",
        })
    }
}

/// Astronomical data for one local 24-hour period.
///
/// `age` is the moon-phase age at `midnight`: 0.0 is new moon, 0.5 full moon,
/// and values approach 1.0 just before the next new moon. Any of the four
/// rise/set instants may be absent (polar day or night, or the event simply
/// not happening inside this period).
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use moonclock::{Body, DailyRecord, Direction};
///
/// let midnight = DateTime::parse_from_rfc3339("2024-03-01T00:00:00-08:00").unwrap();
/// let sunrise = DateTime::parse_from_rfc3339("2024-03-01T06:41:00-08:00").unwrap();
///
/// let record = DailyRecord::new(0.62, midnight)
///     .unwrap()
///     .with_sunrise(Some(sunrise));
///
/// assert_eq!(record.event(Body::Sun, Direction::Rise), Some(sunrise));
/// assert_eq!(record.event(Body::Moon, Direction::Set), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DailyRecord {
    age: f64,
    midnight: DateTime<FixedOffset>,
    sunrise: Option<DateTime<FixedOffset>>,
    sunset: Option<DateTime<FixedOffset>>,
    moonrise: Option<DateTime<FixedOffset>>,
    moonset: Option<DateTime<FixedOffset>>,
}

impl DailyRecord {
    /// Create a record with no rise/set events.
    ///
    /// Fails when `age` is not a finite value in `[0, 1)`.
    pub fn new(age: f64, midnight: DateTime<FixedOffset>) -> Result<Self, EngineError> {
        if !age.is_finite() || !(0.0..1.0).contains(&age) {
            return Err(EngineError::InvalidRecord(format!(
                "moon age {age} outside [0, 1) for {midnight}"
            )));
        }
        Ok(Self {
            age,
            midnight,
            sunrise: None,
            sunset: None,
            moonrise: None,
            moonset: None,
        })
    }

    /// Build a record from a phase value in percent of the lunation
    /// (0–100), the unit rise/set services usually report.
    pub fn from_phase_percent(
        percent: f64,
        midnight: DateTime<FixedOffset>,
    ) -> Result<Self, EngineError> {
        Self::new(percent / 100.0, midnight)
    }

    pub fn with_sunrise(mut self, at: Option<DateTime<FixedOffset>>) -> Self {
        self.sunrise = at;
        self
    }

    pub fn with_sunset(mut self, at: Option<DateTime<FixedOffset>>) -> Self {
        self.sunset = at;
        self
    }

    pub fn with_moonrise(mut self, at: Option<DateTime<FixedOffset>>) -> Self {
        self.moonrise = at;
        self
    }

    pub fn with_moonset(mut self, at: Option<DateTime<FixedOffset>>) -> Self {
        self.moonset = at;
        self
    }

    #[inline]
    pub fn age(&self) -> f64 {
        self.age
    }

    #[inline]
    pub fn midnight(&self) -> DateTime<FixedOffset> {
        self.midnight
    }

    /// Local calendar date this record covers.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.midnight.date_naive()
    }

    #[inline]
    pub fn sunrise(&self) -> Option<DateTime<FixedOffset>> {
        self.sunrise
    }

    #[inline]
    pub fn sunset(&self) -> Option<DateTime<FixedOffset>> {
        self.sunset
    }

    #[inline]
    pub fn moonrise(&self) -> Option<DateTime<FixedOffset>> {
        self.moonrise
    }

    #[inline]
    pub fn moonset(&self) -> Option<DateTime<FixedOffset>> {
        self.moonset
    }

    /// Look up one of the four events by body and direction.
    pub fn event(&self, body: Body, direction: Direction) -> Option<DateTime<FixedOffset>> {
        match (body, direction) {
            (Body::Sun, Direction::Rise) => self.sunrise,
            (Body::Sun, Direction::Set) => self.sunset,
            (Body::Moon, Direction::Rise) => self.moonrise,
            (Body::Moon, Direction::Set) => self.moonset,
        }
    }
}

/// Parse a data-source timestamp such as `2024-03-01T06:41:23.45-08:00`.
///
/// Fractional seconds are accepted and kept. A trailing `Z` is read as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>, EngineError> {
    DateTime::parse_from_rfc3339(input.trim()).map_err(|e| EngineError::InvalidTimestamp {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a UTC offset of the form `+HH:MM` / `-HH:MM`.
pub fn parse_utc_offset(input: &str) -> Result<FixedOffset, EngineError> {
    let invalid = |reason: &str| EngineError::InvalidTimestamp {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid("offset must start with '+' or '-'")),
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| invalid("offset must look like ±HH:MM"))?;
    let field = |digits: &str, what: &str| -> Result<i32, EngineError> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(what));
        }
        digits.parse().map_err(|_| invalid(what))
    };
    let hours = field(hours, "bad hour field")?;
    let minutes = field(minutes, "bad minute field")?;
    if !(0..60).contains(&minutes) {
        return Err(invalid("minutes out of range"));
    }

    FixedOffset::east_opt(sign * (hours * 3_600 + minutes * 60))
        .ok_or_else(|| invalid("offset out of range"))
}
