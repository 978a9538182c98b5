// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Run controller: mode selection, error budget and shutdown cleanup.
//!
//! # Modes
//!
//! - [`RunMode::Once`] retries reconciliation until the first success. Listing
//!   and file errors are counted against an [`ErrorBudget`]; once the count
//!   exceeds the configured maximum the run fails.
//! - [`RunMode::Watch`] hands control to the watch loop, which only returns on
//!   a fatal error.
//!
//! Whatever way the mode ends (success, error, or a shutdown signal) the
//! original file content is restored unless `keep_fragment` is set. A failed
//! restore is itself fatal.

use crate::config::{Config, RunMode};
use crate::errors::{HostsError, Result};
use crate::hosts_file::HostsFile;
use crate::metrics;
use crate::reconciler::reconcile_hosts;
use crate::retry::one_shot_backoff;
use crate::source::IngressSource;
use crate::watch::watch_ingresses;
use std::future::Future;
use tracing::{error, info, warn};

/// Counter of failed one-shot attempts against a ceiling.
///
/// Successes never reset it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBudget {
    failures: u32,
    max: u32,
}

impl ErrorBudget {
    /// Budget tolerating up to `max` failures.
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self { failures: 0, max }
    }

    /// Failures recorded so far.
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Count `err` against the budget.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::ErrorBudgetExceeded`] wrapping `err` once the
    /// failure count is strictly greater than the maximum.
    pub fn record(&mut self, err: HostsError) -> Result<()> {
        self.failures = self.failures.saturating_add(1);
        if self.failures > self.max {
            return Err(HostsError::ErrorBudgetExceeded {
                failures: self.failures,
                max: self.max,
                last: Box::new(err),
            });
        }
        Ok(())
    }
}

/// Reconcile until the first success, absorbing recoverable errors.
///
/// # Errors
///
/// Returns [`HostsError::ErrorBudgetExceeded`] when too many attempts fail, or
/// the first non-recoverable error.
pub async fn run_once<S>(source: &S, hosts: &HostsFile, config: &Config) -> Result<()>
where
    S: IngressSource + ?Sized,
{
    let mut budget = ErrorBudget::new(config.max_errors);
    let mut backoff = one_shot_backoff(config.retry_interval);

    loop {
        match reconcile_hosts(source, hosts, RunMode::Once).await {
            Ok(_) => return Ok(()),
            Err(e) if e.is_recoverable() => {
                warn!(
                    error = %e,
                    failures = budget.failures().saturating_add(1),
                    max_errors = config.max_errors,
                    "Hosts file creation error"
                );
                budget.record(e)?;
                tokio::time::sleep(backoff.next_backoff()).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run the configured mode to completion.
///
/// # Errors
///
/// Returns the terminal error of the mode; in watch mode this is the only way
/// it returns.
pub async fn run_mode<S>(source: &S, hosts: &HostsFile, config: &Config) -> Result<()>
where
    S: IngressSource + ?Sized,
{
    info!(mode = config.mode.as_str(), path = %hosts.path().display(), "Starting");

    match config.mode {
        RunMode::Once => run_once(source, hosts, config).await,
        RunMode::Watch => match watch_ingresses(source, hosts).await {
            Ok(never) => match never {},
            Err(e) => Err(e),
        },
    }
}

/// Run the configured mode until it ends or `shutdown` resolves, then clean up.
///
/// # Errors
///
/// Returns [`HostsError::Cleanup`] if the original file cannot be restored,
/// otherwise the terminal error of the mode.
pub async fn run<S, F>(source: &S, hosts: &HostsFile, config: &Config, shutdown: F) -> Result<()>
where
    S: IngressSource + ?Sized,
    F: Future<Output = ()>,
{
    let outcome = tokio::select! {
        result = run_mode(source, hosts, config) => result,
        () = shutdown => {
            info!("Shutdown requested");
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        error!(error = %e, "Controller stopped with error");
        metrics::record_error(e.kind());
    }

    if config.keep_fragment {
        info!(path = %hosts.path().display(), "Leaving managed fragment in place");
        return outcome;
    }

    hosts.restore_original().inspect_err(|e| {
        error!(error = %e, "Error during cleanup");
    })?;

    outcome
}
