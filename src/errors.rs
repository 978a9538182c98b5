// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the ingress-hosts controller.
//!
//! Every failure the reconciliation engine can hit is one variant of
//! [`HostsError`]. The variant decides how the run controller reacts:
//!
//! - `List` and `FileAccess` are absorbed by the one-shot error budget
//! - everything else is fatal as soon as it surfaces
//!
//! Inside the watch loop there is no budget, so every error is fatal there.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring, listing, watching or writing.
#[derive(Error, Debug)]
pub enum HostsError {
    /// Bad or missing startup parameters
    #[error("Invalid configuration: {reason}")]
    Config {
        /// What is wrong with the configuration
        reason: String,
    },

    /// The Kubernetes client could not be built
    #[error("Failed to connect to Kubernetes API: {reason}")]
    ApiConnect {
        /// Underlying client or kubeconfig error
        reason: String,
    },

    /// Listing ingresses failed
    #[error("Failed to list ingresses: {reason}")]
    List {
        /// Underlying API error
        reason: String,
    },

    /// Opening the ingress watch stream failed
    #[error("Watch error: {reason}")]
    Subscribe {
        /// Underlying API error
        reason: String,
    },

    /// The target file could not be opened, read or written
    #[error("Cannot access {}: {source}", path.display())]
    FileAccess {
        /// Target file path
        path: PathBuf,
        /// I/O error from the filesystem
        #[source]
        source: std::io::Error,
    },

    /// Splitting the file on the fragment delimiter produced nothing
    #[error("Malformed managed file: {reason}")]
    MalformedFile {
        /// What went wrong while splitting
        reason: String,
    },

    /// Restoring the original file during shutdown failed
    #[error("Failed to restore original content of {}: {source}", path.display())]
    Cleanup {
        /// Target file path
        path: PathBuf,
        /// I/O error from the filesystem
        #[source]
        source: std::io::Error,
    },

    /// The one-shot error budget ran out
    #[error("Giving up after {failures} failed reconciliations (max {max})")]
    ErrorBudgetExceeded {
        /// Failures counted so far
        failures: u32,
        /// Configured ceiling
        max: u32,
        /// The failure that exhausted the budget
        #[source]
        last: Box<HostsError>,
    },
}

impl HostsError {
    /// Whether the one-shot loop may count this error against its budget
    /// and try again.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::List { .. } | Self::FileAccess { .. })
    }

    /// Short label used for the `kind` dimension of the error metric.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::ApiConnect { .. } => "api_connect",
            Self::List { .. } => "list",
            Self::Subscribe { .. } => "subscribe",
            Self::FileAccess { .. } => "file_access",
            Self::MalformedFile { .. } => "malformed_file",
            Self::Cleanup { .. } => "cleanup",
            Self::ErrorBudgetExceeded { .. } => "error_budget",
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = HostsError> = std::result::Result<T, E>;
