// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Moon-phase interpolation.
//!
//! The data source only reports the phase age at each local midnight. Between
//! two samples the age is interpolated linearly, which is accurate enough for
//! a display that refreshes every few seconds. Illumination is then derived
//! from the age with the usual cosine law:
//!
//! ```text
//! lit(age) = (1 − cos(2π·age)) · 50            age ≤ 0.5
//! lit(age) = (1 + cos(2π·(age − 0.5))) · 50    age > 0.5
//! ```
//!
//! so the percentage moves quickly around the quarters and barely changes
//! near new and full moon.

use std::f64::consts::TAU;

/// Number of pre-rendered phase frames, indexed on linear age.
pub const FRAME_COUNT: u8 = 100;

/// Percentages at or above this value are shown as a plain `100%`.
pub const FULL_LABEL_THRESHOLD: f64 = 99.95;

/// Interpolated phase at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPhase {
    /// Continuous age in `[0, 1)`.
    pub age: f64,
    /// Frame in `0..FRAME_COUNT`.
    pub frame: u8,
    /// Illuminated fraction of the disc, in percent.
    pub illuminated: f64,
}

impl MoonPhase {
    /// Derive frame and illumination from an age.
    pub fn from_age(age: f64) -> Self {
        Self {
            age,
            frame: frame_index(age),
            illuminated: illuminated_percent(age),
        }
    }

    /// Interpolate between two midnight samples.
    pub fn interpolate(age_today: f64, age_tomorrow: f64, ratio: f64) -> Self {
        Self::from_age(interpolate_age(age_today, age_tomorrow, ratio))
    }

    /// Display string for the illuminated percentage.
    pub fn label(&self) -> String {
        percent_label(self.illuminated)
    }
}

/// Linear interpolation of the phase age across new moon.
///
/// When `age_tomorrow < age_today` the lunation wrapped from 1.0 to 0.0
/// during the window, so tomorrow's age is lifted by one cycle before
/// interpolating. The result is always reduced into `[0, 1)`, including for
/// ratios slightly outside `[0, 1)`.
///
/// # Examples
///
/// ```
/// use moonclock::interpolate_age;
///
/// assert!((interpolate_age(0.25, 0.28, 0.5) - 0.265).abs() < 1e-12);
/// assert!((interpolate_age(0.9, 0.1, 0.25) - 0.95).abs() < 1e-12);
/// ```
pub fn interpolate_age(age_today: f64, age_tomorrow: f64, ratio: f64) -> f64 {
    let delta = if age_tomorrow < age_today {
        age_tomorrow + 1.0 - age_today
    } else {
        age_tomorrow - age_today
    };
    wrap_unit(age_today + delta * ratio)
}

/// Frame to display for `age`, in `0..FRAME_COUNT`.
#[inline]
pub fn frame_index(age: f64) -> u8 {
    let frames = i64::from(FRAME_COUNT);
    ((age * frames as f64).floor() as i64).rem_euclid(frames) as u8
}

/// Illuminated percentage of the lunar disc for a given age.
pub fn illuminated_percent(age: f64) -> f64 {
    if age <= 0.5 {
        (1.0 - (age * TAU).cos()) * 50.0
    } else {
        (1.0 + ((age - 0.5) * TAU).cos()) * 50.0
    }
}

/// Format an illuminated percentage the way the clock face shows it.
///
/// Values from [`FULL_LABEL_THRESHOLD`] up are shown as `100%`; everything
/// else is nudged by 0.05 and printed with one decimal.
///
/// ```
/// use moonclock::percent_label;
///
/// assert_eq!(percent_label(99.96), "100%");
/// assert_eq!(percent_label(42.0), "42.0%");
/// assert_eq!(percent_label(0.0), "0.1%");
/// ```
pub fn percent_label(percent: f64) -> String {
    if percent >= FULL_LABEL_THRESHOLD {
        "100%".to_string()
    } else {
        format!("{:.1}%", percent + 0.05)
    }
}

/// Reduce into `[0, 1)`. `rem_euclid` can round a tiny negative input up to
/// exactly 1.0, which folds back to 0.0 here.
#[inline]
fn wrap_unit(x: f64) -> f64 {
    let r = x.rem_euclid(1.0);
    if r >= 1.0 {
        0.0
    } else {
        r
    }
}
