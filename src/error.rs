// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types for the moon-clock engine.
//!
//! Failures are split by who reports them:
//!
//! - [`FetchError`] comes from the daily-record data source.
//! - [`SyncError`] comes from the wall-clock collaborator and is never fatal.
//! - [`EngineError`] is what the engine itself returns; only
//!   [`EngineError::Startup`] and [`EngineError::RolloverFailed`] require the
//!   caller to restart the process (see [`EngineError::is_fatal`]).

use chrono::{DateTime, FixedOffset, NaiveDate};
use thiserror::Error;

/// Failure while fetching a [`DailyRecord`](crate::DailyRecord).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network or server hiccup; worth retrying.
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// The source answered, but with data the engine cannot use.
    #[error("record for {date} rejected: {reason}")]
    Rejected { date: NaiveDate, reason: String },

    /// Every attempt of the retry budget failed.
    #[error("fetch for {date} gave up after {attempts} attempts: {last}")]
    Exhausted {
        date: NaiveDate,
        attempts: u32,
        last: String,
    },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

/// Failure while synchronising the wall clock with a time server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("time server unreachable: {0}")]
    Unreachable(String),

    #[error("time server answer malformed: {0}")]
    Malformed(String),
}

/// Errors returned by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid daily record: {0}")]
    InvalidRecord(String),

    #[error("invalid event window: tomorrow starts at {tomorrow}, not after today at {today}")]
    InvalidWindow {
        today: DateTime<FixedOffset>,
        tomorrow: DateTime<FixedOffset>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unparseable timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    /// Initial two-day fetch failed; nothing to show yet.
    #[error("startup fetch failed")]
    Startup(#[source] FetchError),

    /// The window expired and could not be refreshed.
    #[error("window expired at {expired_at} and could not be refreshed")]
    RolloverFailed {
        expired_at: DateTime<FixedOffset>,
        #[source]
        cause: Box<EngineError>,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl EngineError {
    /// True when the only sane reaction is restarting the whole process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Startup(_) | EngineError::RolloverFailed { .. }
        )
    }
}
