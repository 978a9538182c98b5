// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Continuous watch loop.
//!
//! The loop alternates between two states:
//!
//! 1. **Subscribing** - open a change stream. Failure here is fatal.
//! 2. **Streaming** - drain events one at a time. `Added` and `Modified`
//!    events trigger a full reconciliation; anything else is ignored. A failed
//!    reconciliation is fatal. When the stream closes, go back to 1.
//!
//! Streams close routinely when the API server times the watch out, so
//! resubscription is unbounded. There is no error budget in this mode.

use crate::config::RunMode;
use crate::errors::Result;
use crate::hosts_file::HostsFile;
use crate::metrics;
use crate::reconciler::reconcile_hosts;
use crate::source::IngressSource;
use futures::StreamExt;
use std::convert::Infallible;
use tracing::{debug, error, info};

/// Watch ingresses and regenerate the hosts file on every add or modify.
///
/// Only returns on a fatal error.
///
/// # Errors
///
/// Returns [`crate::errors::HostsError::Subscribe`] if a subscription cannot be opened, or
/// the error of the first failed reconciliation.
pub async fn watch_ingresses<S>(source: &S, hosts: &HostsFile) -> Result<Infallible>
where
    S: IngressSource + ?Sized,
{
    loop {
        let mut events = source.watch_ingresses().await.inspect_err(|e| {
            error!(error = %e, "Failed to subscribe to ingress events");
            metrics::record_error(e.kind());
        })?;
        info!("Subscribed to ingress events");

        while let Some(event) = events.next().await {
            metrics::record_watch_event(event.kind.as_str());

            if !event.kind.triggers_reconcile() {
                debug!(
                    event = event.kind.as_str(),
                    ingress = event.ingress_name(),
                    detail = ?event.detail,
                    "Ignoring ingress event"
                );
                continue;
            }

            info!(
                event = event.kind.as_str(),
                ingress = event.ingress_name(),
                "Ingress changed, regenerating hosts file"
            );
            reconcile_hosts(source, hosts, RunMode::Watch)
                .await
                .inspect_err(|e| error!(error = %e, "Reconciliation failed while watching"))?;
        }

        info!("Ingress event stream closed, resubscribing");
        metrics::record_resubscription();
    }
}
