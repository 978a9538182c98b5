// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared helpers for unit tests.

use crate::aggregator::IngressRecord;
use crate::errors::{HostsError, Result};
use crate::source::{EventKind, IngressEvent, IngressSource};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

pub const HOSTS_PREFIX: &str = "127.0.0.1\tlocalhost\n::1\tlocalhost ip6-localhost\n";

/// One scripted answer to `watch_ingresses`.
pub enum Subscription {
    /// Stream that yields these events and then closes
    Events(Vec<IngressEvent>),
    /// Stream that never yields
    Pending,
}

/// In-memory ingress source driven by a script.
///
/// `list_ingresses` pops queued results and falls back to `listing` once the
/// queue is empty. `watch_ingresses` pops queued subscriptions and fails with
/// `Subscribe` once they run out, which is how tests stop the watch loop.
pub struct ScriptedSource {
    listing: Vec<IngressRecord>,
    list_results: Mutex<VecDeque<Result<Vec<IngressRecord>>>>,
    subscriptions: Mutex<VecDeque<Subscription>>,
    pub list_calls: AtomicUsize,
    pub watch_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(listing: Vec<IngressRecord>) -> Self {
        Self {
            listing,
            list_results: Mutex::new(VecDeque::new()),
            subscriptions: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_list_failures(self, count: usize) -> Self {
        {
            let mut results = self.list_results.lock().unwrap();
            for attempt in 0..count {
                results.push_back(Err(HostsError::List {
                    reason: format!("scripted failure {attempt}"),
                }));
            }
        }
        self
    }

    pub fn with_events(self, kinds: &[EventKind]) -> Self {
        let events = kinds.iter().map(|kind| IngressEvent::new(*kind)).collect();
        self.with_subscription(Subscription::Events(events))
    }

    pub fn with_subscription(self, subscription: Subscription) -> Self {
        self.subscriptions.lock().unwrap().push_back(subscription);
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
impl IngressSource for ScriptedSource {
    async fn list_ingresses(&self) -> Result<Vec<IngressRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.list_results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(self.listing.clone()))
    }

    async fn watch_ingresses<'a>(&'a self) -> Result<BoxStream<'a, IngressEvent>> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.subscriptions.lock().unwrap().pop_front();
        match next {
            Some(Subscription::Events(events)) => Ok(stream::iter(events).boxed()),
            Some(Subscription::Pending) => Ok(stream::pending().boxed()),
            None => Err(HostsError::Subscribe {
                reason: "script exhausted".to_string(),
            }),
        }
    }
}

/// Temp directory holding a `hosts` file with `content`.
pub fn create_hosts_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hosts");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

pub fn sample_listing() -> Vec<IngressRecord> {
    vec![
        IngressRecord::new("web", Some("10.0.0.1"), &["a.example.com", ""]),
        IngressRecord::new("api", Some("10.0.0.1"), &["b.example.com"]),
        IngressRecord::new("pending", None, &["c.example.com"]),
    ]
}

pub const SAMPLE_FRAGMENT_LINE: &str = "10.0.0.1\t a.example.com b.example.com\n";
