// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Engine configuration.
//!
//! Reading the configuration from disk (or from a secrets file) is left to
//! the application. With the `serde` feature enabled, [`EngineConfig`] can be
//! deserialized directly; missing fields fall back to [`Default`].

use crate::error::EngineError;
use crate::format::EventLabelMode;
use crate::record::parse_utc_offset;
use crate::source::{Location, RetryPolicy};
use chrono::FixedOffset;
use qtty::Seconds;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunables for [`MoonClock`](crate::MoonClock).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Time-zone name handed to the time server; `None` lets it geolocate.
    pub timezone: Option<String>,
    /// Offset assumed until the first successful sync, as `±HH:MM`.
    pub utc_offset: String,
    /// 12-hour clock face instead of 24-hour.
    pub twelve_hour: bool,
    /// Show time-until instead of time-of for rise/set events.
    pub countdown: bool,
    /// Wrap afternoon event hours to 1–11 for narrow (portrait) layouts.
    pub compact_event_hours: bool,
    pub sync_interval_secs: u64,
    pub sync_backoff_secs: u64,
    /// Pause between refreshes, honoured by the outer loop.
    pub refresh_delay_secs: u64,
    pub fetch_attempts: u32,
    pub fetch_retry_delay_secs: u64,
    /// The face is shown only while `wake_after_hour < hour < sleep_from_hour`.
    pub wake_after_hour: u32,
    pub sleep_from_hour: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            timezone: None,
            utc_offset: "-08:00".to_string(),
            twelve_hour: true,
            countdown: false,
            compact_event_hours: false,
            sync_interval_secs: 3_600,
            sync_backoff_secs: 1_800,
            refresh_delay_secs: 10,
            fetch_attempts: 5,
            fetch_retry_delay_secs: 15,
            wake_after_hour: 7,
            sleep_from_hour: 23,
        }
    }
}

impl EngineConfig {
    /// Check every constraint the engine relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| -> Result<(), EngineError> {
            Err(EngineError::InvalidConfig(msg))
        };

        if !(-90.0..=90.0).contains(&self.latitude) {
            return invalid(format!("latitude {} outside [-90, 90]", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return invalid(format!("longitude {} outside [-180, 180]", self.longitude));
        }
        if self.sync_interval_secs == 0 {
            return invalid("sync interval must be positive".into());
        }
        if self.sync_backoff_secs == 0 || self.sync_backoff_secs >= self.sync_interval_secs {
            return invalid(format!(
                "sync backoff {}s must be positive and shorter than the interval {}s",
                self.sync_backoff_secs, self.sync_interval_secs
            ));
        }
        if !(5..=60).contains(&self.refresh_delay_secs) {
            return invalid(format!(
                "refresh delay {}s outside 5..=60",
                self.refresh_delay_secs
            ));
        }
        if self.fetch_attempts == 0 {
            return invalid("at least one fetch attempt is required".into());
        }
        if self.wake_after_hour > 23 || self.sleep_from_hour > 24 {
            return invalid("wake/sleep hours must be within a day".into());
        }
        self.offset().map(|_| ())
    }

    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Configured fallback offset.
    pub fn offset(&self) -> Result<FixedOffset, EngineError> {
        parse_utc_offset(&self.utc_offset)
    }

    pub fn sync_interval(&self) -> Seconds {
        Seconds::new(self.sync_interval_secs as f64)
    }

    pub fn sync_backoff(&self) -> Seconds {
        Seconds::new(self.sync_backoff_secs as f64)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_delay_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.fetch_attempts,
            delay: Duration::from_secs(self.fetch_retry_delay_secs),
        }
    }

    pub fn label_mode(&self) -> EventLabelMode {
        if self.countdown {
            EventLabelMode::Countdown
        } else {
            EventLabelMode::ClockTime
        }
    }

    /// Whether the clock face should be lit at local hour `hour`.
    #[inline]
    pub fn is_awake(&self, hour: u32) -> bool {
        self.wake_after_hour < hour && hour < self.sleep_from_hour
    }
}
