// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `retry.rs`

#[cfg(test)]
mod tests {
    use crate::retry::*;
    use std::time::Duration;

    #[test]
    fn test_backoff_doubles() {
        let mut backoff = one_shot_backoff(Duration::from_millis(100));

        assert_eq!(backoff.next_backoff(), Duration::from_millis(100));
        assert_eq!(backoff.next_backoff(), Duration::from_millis(200));
        assert_eq!(backoff.next_backoff(), Duration::from_millis(400));
        assert_eq!(backoff.next_backoff(), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_is_capped_at_max_interval() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(4), Duration::from_secs(10), 2.0);

        assert_eq!(backoff.next_backoff(), Duration::from_secs(4));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(8));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
    }

    #[test]
    fn test_initial_interval_above_max_is_clamped() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(60), Duration::from_secs(30), 2.0);

        assert_eq!(backoff.next_backoff(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_stays_zero() {
        let mut backoff = one_shot_backoff(Duration::ZERO);

        for _ in 0..5 {
            assert_eq!(backoff.next_backoff(), Duration::ZERO);
        }
    }
}
