// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Exponential backoff between one-shot reconciliation attempts.
//!
//! The one-shot loop is bounded by its error budget, not by elapsed time, so
//! the backoff only spaces attempts out and never gives up on its own.

use crate::constants::{MAX_RETRY_INTERVAL_SECS, RETRY_BACKOFF_MULTIPLIER};
use std::time::Duration;

/// Simple exponential backoff implementation.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Current interval duration
    pub current_interval: Duration,
    /// Maximum interval duration
    pub max_interval: Duration,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with specified parameters.
    #[must_use]
    pub fn new(initial_interval: Duration, max_interval: Duration, multiplier: f64) -> Self {
        Self {
            current_interval: initial_interval.min(max_interval),
            max_interval,
            multiplier,
        }
    }

    /// Get the next backoff interval and grow the following one.
    pub fn next_backoff(&mut self) -> Duration {
        let interval = self.current_interval;

        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);

        interval
    }
}

/// Create the backoff used between one-shot attempts.
///
/// # Retry Schedule
///
/// With the default 100ms initial interval, retries occur at approximately
/// 100ms, 200ms, 400ms, 800ms, 1.6s ... capped at 30 seconds.
#[must_use]
pub fn one_shot_backoff(initial_interval: Duration) -> ExponentialBackoff {
    ExponentialBackoff::new(
        initial_interval,
        Duration::from_secs(MAX_RETRY_INTERVAL_SECS),
        RETRY_BACKOFF_MULTIPLIER,
    )
}
