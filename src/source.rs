// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Upstream source of ingress state.
//!
//! The reconciliation engine only needs two things from the cluster: a full
//! listing of ingresses and a stream of change events. [`IngressSource`] is
//! that seam; [`KubeIngressSource`] implements it against the Kubernetes API
//! and tests substitute scripted sources.

use crate::aggregator::IngressRecord;
use crate::config::ApiTarget;
use crate::constants::{KIND_INGRESS, WATCH_START_VERSION};
use crate::errors::{HostsError, Result};
use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{ListParams, WatchEvent, WatchParams};
use kube::{Api, Client};
use tracing::debug;

/// Kind of an ingress change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An ingress was created (or is reported by the initial watch sync)
    Added,
    /// An existing ingress changed
    Modified,
    /// An ingress was deleted
    Deleted,
    /// Resource version checkpoint without an object
    Bookmark,
    /// The server or transport reported an error on the stream
    Error,
}

impl EventKind {
    /// Whether an event of this kind starts a reconciliation cycle.
    ///
    /// Deletions do not: their stale hostnames linger until the next add or
    /// modify regenerates the whole fragment.
    #[must_use]
    pub fn triggers_reconcile(self) -> bool {
        matches!(self, Self::Added | Self::Modified)
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Bookmark => "bookmark",
            Self::Error => "error",
        }
    }
}

/// One item from an ingress watch stream.
///
/// The payload is only used for logging; reconciliation always re-lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressEvent {
    /// What happened
    pub kind: EventKind,
    /// The ingress the event refers to, if the event carries one
    pub ingress: Option<IngressRecord>,
    /// Error detail for [`EventKind::Error`] events
    pub detail: Option<String>,
}

impl IngressEvent {
    /// Event of `kind` without payload.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            ingress: None,
            detail: None,
        }
    }

    /// Event of `kind` carrying `ingress`.
    #[must_use]
    pub fn with_ingress(kind: EventKind, ingress: IngressRecord) -> Self {
        Self {
            kind,
            ingress: Some(ingress),
            detail: None,
        }
    }

    fn error(detail: String) -> Self {
        Self {
            kind: EventKind::Error,
            ingress: None,
            detail: Some(detail),
        }
    }

    /// Name of the ingress the event refers to, or `""`.
    #[must_use]
    pub fn ingress_name(&self) -> &str {
        self.ingress.as_ref().map_or("", |record| record.name.as_str())
    }
}

impl From<std::result::Result<WatchEvent<Ingress>, kube::Error>> for IngressEvent {
    fn from(item: std::result::Result<WatchEvent<Ingress>, kube::Error>) -> Self {
        match item {
            Ok(WatchEvent::Added(ingress)) => {
                Self::with_ingress(EventKind::Added, IngressRecord::from(&ingress))
            }
            Ok(WatchEvent::Modified(ingress)) => {
                Self::with_ingress(EventKind::Modified, IngressRecord::from(&ingress))
            }
            Ok(WatchEvent::Deleted(ingress)) => {
                Self::with_ingress(EventKind::Deleted, IngressRecord::from(&ingress))
            }
            Ok(WatchEvent::Bookmark(_)) => Self::new(EventKind::Bookmark),
            Ok(WatchEvent::Error(status)) => Self::error(format!("{status:?}")),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Provider of ingress listings and change streams.
#[async_trait::async_trait]
pub trait IngressSource: Send + Sync {
    /// List every ingress in all namespaces.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::List`] if the listing fails.
    async fn list_ingresses(&self) -> Result<Vec<IngressRecord>>;

    /// Open a new change-event subscription.
    ///
    /// The stream ends when the upstream closes it; a closed stream cannot be
    /// resumed and a new subscription must be opened.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Subscribe`] if the subscription cannot be opened.
    async fn watch_ingresses<'a>(&'a self) -> Result<BoxStream<'a, IngressEvent>>;
}

/// [`IngressSource`] backed by the Kubernetes API, watching all namespaces.
#[derive(Clone)]
pub struct KubeIngressSource {
    api: Api<Ingress>,
}

impl KubeIngressSource {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }

    /// Build a client for `target`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::ApiConnect`] if the in-cluster configuration is
    /// unavailable, the host URL is invalid, or the client cannot be built.
    pub fn connect(target: &ApiTarget) -> Result<Self> {
        let config = match target {
            ApiTarget::InCluster => {
                kube::Config::incluster().map_err(|e| HostsError::ApiConnect {
                    reason: format!("Error getting in-cluster config: {e}"),
                })?
            }
            ApiTarget::Host(host) => {
                let uri = host
                    .parse::<http::Uri>()
                    .map_err(|e| HostsError::ApiConnect {
                        reason: format!("Invalid API host '{host}': {e}"),
                    })?;
                kube::Config::new(uri)
            }
        };

        debug!(cluster_url = %config.cluster_url, "Creating Kubernetes client");
        let client = Client::try_from(config).map_err(|e| HostsError::ApiConnect {
            reason: format!("Error creating client: {e}"),
        })?;

        Ok(Self::new(client))
    }
}

#[async_trait::async_trait]
impl IngressSource for KubeIngressSource {
    async fn list_ingresses(&self) -> Result<Vec<IngressRecord>> {
        let list = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(|e| HostsError::List {
                reason: e.to_string(),
            })?;

        debug!(kind = KIND_INGRESS, count = list.items.len(), "Listed resources");
        Ok(list.items.iter().map(IngressRecord::from).collect())
    }

    async fn watch_ingresses<'a>(&'a self) -> Result<BoxStream<'a, IngressEvent>> {
        let stream = self
            .api
            .watch(&WatchParams::default(), WATCH_START_VERSION)
            .await
            .map_err(|e| HostsError::Subscribe {
                reason: e.to_string(),
            })?;

        Ok(stream.map(IngressEvent::from).boxed())
    }
}
