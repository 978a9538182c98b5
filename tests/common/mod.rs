// Common test utilities for integration tests

#![allow(dead_code)]

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use ingress_hosts::aggregator::IngressRecord;
use ingress_hosts::errors::{HostsError, Result};
use ingress_hosts::source::{EventKind, IngressEvent, IngressSource};
use kube::Client;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

pub const HOSTS_PREFIX: &str = "# managed by the node image\n127.0.0.1\tlocalhost\n";

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {}", e);
            None
        }
    }
}

/// Create a temp directory holding a `hosts` file
pub fn create_hosts_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("hosts");
    fs::write(&path, content).expect("write hosts file");
    (temp_dir, path)
}

/// Ingress source whose listing can change between cycles.
///
/// Each `watch_ingresses` call pops the next scripted session; once they run
/// out the subscription fails, which ends the watch loop.
pub struct ClusterSimulator {
    listings: Mutex<VecDeque<Result<Vec<IngressRecord>>>>,
    current: Mutex<Vec<IngressRecord>>,
    sessions: Mutex<VecDeque<Vec<IngressEvent>>>,
    list_calls: AtomicUsize,
    watch_calls: AtomicUsize,
}

impl ClusterSimulator {
    pub fn new(initial: Vec<IngressRecord>) -> Self {
        Self {
            listings: Mutex::new(VecDeque::new()),
            current: Mutex::new(initial),
            sessions: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
        }
    }

    /// Queue the result of a future `list_ingresses` call.
    ///
    /// A successful listing also becomes the state returned afterwards.
    pub fn then_list(self, listing: Result<Vec<IngressRecord>>) -> Self {
        self.listings.lock().unwrap().push_back(listing);
        self
    }

    pub fn then_session(self, kinds: &[EventKind]) -> Self {
        let events = kinds.iter().map(|kind| IngressEvent::new(*kind)).collect();
        self.sessions.lock().unwrap().push_back(events);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IngressSource for ClusterSimulator {
    async fn list_ingresses(&self) -> Result<Vec<IngressRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.listings.lock().unwrap().pop_front();
        match queued {
            Some(Ok(listing)) => {
                *self.current.lock().unwrap() = listing.clone();
                Ok(listing)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.current.lock().unwrap().clone()),
        }
    }

    async fn watch_ingresses<'a>(&'a self) -> Result<BoxStream<'a, IngressEvent>> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.sessions.lock().unwrap().pop_front();
        next.map(|events| stream::iter(events).boxed())
            .ok_or_else(|| HostsError::Subscribe {
                reason: "simulated API server went away".to_string(),
            })
    }
}

pub fn list_failure() -> Result<Vec<IngressRecord>> {
    Err(HostsError::List {
        reason: "simulated 503".to_string(),
    })
}
