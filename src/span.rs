// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Conversions between `chrono` durations and `qtty` quantities.
//!
//! Instants are `chrono::DateTime<FixedOffset>` everywhere in the crate, while
//! configured intervals and window spans are carried as typed [`Seconds`].

use chrono::{DateTime, FixedOffset, TimeDelta};
use qtty::Seconds;

/// Length of a nominal civil day.
pub const SECONDS_PER_DAY: Seconds = Seconds::new(86_400.0);

/// Convert a chrono duration into seconds, keeping sub-second precision.
#[inline]
pub fn to_seconds(delta: TimeDelta) -> Seconds {
    let whole = Seconds::new(delta.num_seconds() as f64);
    let nanos = Seconds::new(delta.subsec_nanos() as f64 / 1e9);
    whole + nanos
}

/// Convert seconds into a chrono duration, rounded to the millisecond.
///
/// Values outside chrono's range saturate at [`TimeDelta::MAX`] /
/// [`TimeDelta::MIN`].
#[inline]
pub fn to_delta(seconds: Seconds) -> TimeDelta {
    let millis = (seconds.value() * 1e3).round();
    if millis >= i64::MAX as f64 {
        TimeDelta::MAX
    } else if millis <= i64::MIN as f64 {
        TimeDelta::MIN
    } else {
        TimeDelta::try_milliseconds(millis as i64).unwrap_or(if millis > 0.0 {
            TimeDelta::MAX
        } else {
            TimeDelta::MIN
        })
    }
}

/// Signed time from `earlier` to `later`.
#[inline]
pub fn between(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> Seconds {
    to_seconds(later.signed_duration_since(earlier))
}
