// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command line parsing and runtime configuration.
//!
//! [`Cli`] is the raw `clap` surface. [`Cli::into_config`] validates it into a
//! [`Config`], which is built once at startup and passed by reference to every
//! component. Nothing reads process-wide state after that.

use crate::constants::{DEFAULT_HOSTS_FILE, DEFAULT_MAX_ERRORS, DEFAULT_RETRY_INTERVAL_MILLIS};
use crate::errors::{HostsError, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Keep Kubernetes Ingress hostnames in a managed block of a hosts file
#[derive(Parser, Debug, Clone)]
#[command(name = "ingress-hosts", version, about, long_about = None)]
pub struct Cli {
    /// The client is running inside a Kubernetes cluster
    #[arg(long)]
    pub incluster: bool,

    /// The Kubernetes API server URL; required if not run in-cluster
    #[arg(long)]
    pub host: Option<String>,

    /// Write the file and then exit; do not watch for ingress changes
    #[arg(long)]
    pub once: bool,

    /// File location for the hosts/zone file
    #[arg(long, default_value = DEFAULT_HOSTS_FILE)]
    pub filepath: PathBuf,

    /// The number of errors acceptable before quitting (one-shot mode)
    #[arg(long, default_value_t = i64::from(DEFAULT_MAX_ERRORS), allow_negative_numbers = true)]
    pub max_errs: i64,

    /// Initial delay between one-shot retries, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_INTERVAL_MILLIS)]
    pub retry_interval_ms: u64,

    /// Serve Prometheus metrics on this address (e.g. 0.0.0.0:9090)
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,

    /// Leave the managed block in place on exit instead of restoring the original file
    #[arg(long)]
    pub keep_fragment: bool,
}

/// Where the Kubernetes API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiTarget {
    /// Use the service account mounted into the pod
    InCluster,
    /// Talk to an explicit API server URL without credentials
    Host(String),
}

/// How the controller runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Reconcile until the first success, then exit
    Once,
    /// Watch ingresses and reconcile on every change
    Watch,
}

impl RunMode {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Watch => "watch",
        }
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Kubernetes API location
    pub api: ApiTarget,
    /// One-shot or continuous watch
    pub mode: RunMode,
    /// Target hosts file
    pub hosts_file: PathBuf,
    /// Failures tolerated in one-shot mode before exiting with an error
    pub max_errors: u32,
    /// Initial delay between one-shot retries
    pub retry_interval: Duration,
    /// Prometheus endpoint address, if enabled
    pub metrics_addr: Option<SocketAddr>,
    /// Skip restoring the original file on exit
    pub keep_fragment: bool,
}

impl Config {
    /// Configuration for an explicit API host with every other option at its default.
    #[must_use]
    pub fn for_host(host: impl Into<String>, hosts_file: impl Into<PathBuf>) -> Self {
        Self {
            api: ApiTarget::Host(host.into()),
            mode: RunMode::Watch,
            hosts_file: hosts_file.into(),
            max_errors: DEFAULT_MAX_ERRORS,
            retry_interval: Duration::from_millis(DEFAULT_RETRY_INTERVAL_MILLIS),
            metrics_addr: None,
            keep_fragment: false,
        }
    }
}

impl Cli {
    /// Validate the parsed arguments.
    ///
    /// A negative `--max-errs` is normalized to the default.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Config`] when neither or both of `--incluster`
    /// and `--host` are given.
    pub fn into_config(self) -> Result<Config> {
        let host = self.host.filter(|host| !host.trim().is_empty());

        let api = match (self.incluster, host) {
            (true, Some(_)) => {
                return Err(HostsError::Config {
                    reason: "--incluster and --host are mutually exclusive".to_string(),
                })
            }
            (true, None) => ApiTarget::InCluster,
            (false, Some(host)) => ApiTarget::Host(host),
            (false, None) => {
                return Err(HostsError::Config {
                    reason: "Must run with --incluster (inside a k8s cluster) or provide a kubernetes host via --host".to_string(),
                })
            }
        };

        let max_errors = u32::try_from(self.max_errs).unwrap_or(if self.max_errs < 0 {
            DEFAULT_MAX_ERRORS
        } else {
            u32::MAX
        });

        Ok(Config {
            api,
            mode: if self.once {
                RunMode::Once
            } else {
                RunMode::Watch
            },
            hosts_file: self.filepath,
            max_errors,
            retry_interval: Duration::from_millis(self.retry_interval_ms),
            metrics_addr: self.metrics_addr,
            keep_fragment: self.keep_fragment,
        })
    }
}
