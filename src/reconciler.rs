// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! One reconciliation cycle: list, aggregate, rewrite.

use crate::aggregator::aggregate;
use crate::config::RunMode;
use crate::errors::Result;
use crate::hosts_file::HostsFile;
use crate::metrics;
use crate::source::IngressSource;
use std::time::Instant;
use tracing::{debug, info};

/// Run one full reconciliation cycle.
///
/// Always starts from a fresh listing so the fragment reflects every ingress,
/// not just the one that triggered the cycle. Returns the number of IP entries
/// written.
///
/// # Errors
///
/// Returns the listing error ([`crate::errors::HostsError::List`]) or the file
/// error ([`crate::errors::HostsError::FileAccess`] /
/// [`crate::errors::HostsError::MalformedFile`]) that aborted the cycle.
pub async fn reconcile_hosts<S>(source: &S, hosts: &HostsFile, mode: RunMode) -> Result<usize>
where
    S: IngressSource + ?Sized,
{
    let start = Instant::now();

    let result: Result<usize> = async {
        let records = source.list_ingresses().await?;
        debug!(count = records.len(), "Listed ingresses");

        let book = aggregate(&records);
        hosts.reconcile(&book)?;
        Ok(book.len())
    }
    .await;

    match &result {
        Ok(addresses) => {
            info!(
                mode = mode.as_str(),
                path = %hosts.path().display(),
                addresses,
                "Reconciled hosts file"
            );
            metrics::record_reconciliation_success(mode.as_str(), start.elapsed(), *addresses);
        }
        Err(e) => {
            metrics::record_reconciliation_error(mode.as_str(), start.elapsed(), e.kind());
        }
    }

    result
}
