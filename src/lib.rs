// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # ingress-hosts - Kubernetes Ingress hostnames in a hosts file
//!
//! ingress-hosts watches Ingress resources across a cluster and keeps a managed
//! block of `IP hostname...` lines at the end of a hosts (or zone) file. Anything
//! above the block is left untouched, and the original file is restored on exit.
//!
//! ## Modules
//!
//! - [`aggregator`] - Ingress snapshots and the IP → hostnames address book
//! - [`fragment`] - Rendering and stripping of the managed block
//! - [`hosts_file`] - Safe, idempotent rewrites of the target file
//! - [`source`] - The Kubernetes ingress source and its trait seam
//! - [`watch`] - Continuous watch loop with unbounded resubscription
//! - [`runner`] - Mode selection, error budget and shutdown cleanup
//! - [`config`] - Command line parsing and validated configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use ingress_hosts::aggregator::{aggregate, IngressRecord};
//! use ingress_hosts::hosts_file::HostsFile;
//!
//! # fn main() -> Result<(), ingress_hosts::errors::HostsError> {
//! let records = vec![IngressRecord::new("web", Some("10.0.0.1"), &["web.example.com"])];
//!
//! let hosts = HostsFile::open("/etc/hosts")?;
//! hosts.reconcile(&aggregate(&records))?;
//! hosts.restore_original()?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod errors;
pub mod fragment;
pub mod hosts_file;
pub mod metrics;
pub mod reconciler;
pub mod retry;
pub mod runner;
pub mod source;
pub mod watch;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod fragment_tests;
#[cfg(test)]
mod retry_tests;
