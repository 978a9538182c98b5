// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the ingress-hosts controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Managed Fragment Constants
// ============================================================================

/// Marker that opens the managed fragment inside the target file.
///
/// Everything from this marker to end-of-file is owned by the controller.
/// The exact byte sequence is part of the on-disk format and must not change.
pub const FRAGMENT_DELIMITER: &str = "\n\n##BEGIN K8S HOSTS##\n";

/// Separator between an IP and its hostname list
pub const IP_HOST_SEPARATOR: char = '\t';

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Default target file
pub const DEFAULT_HOSTS_FILE: &str = "/etc/hosts";

/// Default number of tolerated one-shot failures before giving up
pub const DEFAULT_MAX_ERRORS: u32 = 10;

/// Default initial interval between one-shot retries (100ms)
pub const DEFAULT_RETRY_INTERVAL_MILLIS: u64 = 100;

/// Maximum interval between one-shot retries (30 seconds)
pub const MAX_RETRY_INTERVAL_SECS: u64 = 30;

/// Backoff multiplier for one-shot retries
pub const RETRY_BACKOFF_MULTIPLIER: f64 = 2.0;

// ============================================================================
// Kubernetes Constants
// ============================================================================

/// Kind name for the watched resource, used in logs and metric labels
pub const KIND_INGRESS: &str = "Ingress";

/// Resource version passed to the first watch request ("any version")
pub const WATCH_START_VERSION: &str = "0";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Name given to tokio worker threads
pub const RUNTIME_THREAD_NAME: &str = "ingress-hosts";

/// Number of tokio worker threads; reconciliation is strictly sequential
pub const RUNTIME_WORKER_THREADS: usize = 2;

/// Path of the Prometheus scrape endpoint
pub const METRICS_PATH: &str = "/metrics";
