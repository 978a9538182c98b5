// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Aggregation of observed ingresses into an IP → hostnames address book.
//!
//! Every reconciliation cycle starts from a fresh listing of all ingresses.
//! The listing is folded into an [`AddressBook`], which the fragment codec
//! turns into the managed block of the target file.
//!
//! # Rules
//!
//! - An ingress without a load-balancer IP contributes nothing.
//! - An ingress with an IP always reserves an entry for it, even when none of
//!   its rules carries a host.
//! - Rules with an empty (or all-whitespace) host are skipped.
//! - Hosts are appended in encounter order; ingresses sharing an IP are
//!   concatenated and never deduplicated.

use k8s_openapi::api::networking::v1::Ingress;
use std::collections::BTreeMap;
use tracing::debug;

/// One host rule of an ingress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressRule {
    /// Hostname the rule matches; empty when the rule has no host
    pub host: String,
}

/// Read-only snapshot of one cluster ingress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressRecord {
    /// Ingress name, used for diagnostics only
    pub name: String,
    /// Ingress namespace, used for diagnostics only
    pub namespace: Option<String>,
    /// First IP assigned by the load balancer, if any
    pub load_balancer_ip: Option<String>,
    /// Host rules in declaration order
    pub rules: Vec<IngressRule>,
}

impl IngressRecord {
    /// Convenience constructor used by tests and scripted sources.
    pub fn new(name: impl Into<String>, ip: Option<&str>, hosts: &[&str]) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            load_balancer_ip: ip.map(str::to_string),
            rules: hosts
                .iter()
                .map(|host| IngressRule {
                    host: (*host).to_string(),
                })
                .collect(),
        }
    }
}

impl From<&Ingress> for IngressRecord {
    fn from(ingress: &Ingress) -> Self {
        // Only the first load-balancer entry counts; an entry without an IP
        // (hostname-only load balancers) means no IP.
        let load_balancer_ip = ingress
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.ip.clone())
            .filter(|ip| !ip.trim().is_empty());

        let rules = ingress
            .spec
            .as_ref()
            .and_then(|spec| spec.rules.as_ref())
            .map(|rules| {
                rules
                    .iter()
                    .map(|rule| IngressRule {
                        host: rule.host.clone().unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: ingress.metadata.name.clone().unwrap_or_default(),
            namespace: ingress.metadata.namespace.clone(),
            load_balancer_ip,
            rules,
        }
    }
}

/// Mapping of IP address to the hostnames that resolve to it.
///
/// Iteration is sorted by IP so the rendered fragment is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    entries: BTreeMap<String, Vec<String>>,
}

impl AddressBook {
    /// Create an empty address book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an entry for `ip`, returning its hostname list.
    pub fn entry(&mut self, ip: &str) -> &mut Vec<String> {
        self.entries.entry(ip.to_string()).or_default()
    }

    /// Hostnames mapped to `ip`, if the IP has an entry.
    #[must_use]
    pub fn get(&self, ip: &str) -> Option<&[String]> {
        self.entries.get(ip).map(Vec::as_slice)
    }

    /// Iterate over `(ip, hostnames)` pairs in IP order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(ip, hosts)| (ip.as_str(), hosts.as_slice()))
    }

    /// Number of IP entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book has no IP entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> From<[(&str, &[&str]); N]> for AddressBook {
    fn from(pairs: [(&str, &[&str]); N]) -> Self {
        let mut book = Self::new();
        for (ip, hosts) in pairs {
            book.entry(ip)
                .extend(hosts.iter().map(|host| (*host).to_string()));
        }
        book
    }
}

/// Fold a listing of ingresses into an [`AddressBook`].
///
/// Never fails; records that cannot contribute are skipped with a debug log.
#[must_use]
pub fn aggregate(records: &[IngressRecord]) -> AddressBook {
    let mut book = AddressBook::new();

    for record in records {
        debug!(
            ingress = %record.name,
            namespace = ?record.namespace,
            "Processing ingress"
        );

        let Some(ip) = record
            .load_balancer_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        else {
            debug!(ingress = %record.name, "No load balancer IP assigned, skipping ingress");
            continue;
        };

        let hosts = book.entry(ip);
        for rule in &record.rules {
            let host = rule.host.trim();
            if host.is_empty() {
                debug!(
                    ingress = %record.name,
                    ip = %ip,
                    "Not adding empty host entry"
                );
                continue;
            }
            hosts.push(host.to_string());
        }
    }

    debug!(addresses = book.len(), "Aggregated ingresses into address book");
    book
}
