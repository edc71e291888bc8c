//! Endpoint reconciliation of fingerprint and HTTP probe results.
//!
//! Fingerprint records are grouped per endpoint into clusters. A cluster holding a bare-HTTP
//! `[400]` answer next to an https answer is collapsed into one https row; otherwise the cluster
//! yields a row from its first record. Every row is enriched with the probe data indexed under
//! the same endpoint, and probed endpoints no cluster claimed are appended at the end.

mod cluster;
mod index;

pub use cluster::BARE_HTTP_MARKER;

use scanmerge_core::{Endpoint, FingerprintRecord, MergedRecord, ProbeRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// How several probe records for the same endpoint are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    #[default]
    KeepLast,
    KeepFirst,
    CollectAll,
}

/// How many rows a non-collapsed cluster produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterMode {
    /// One row per endpoint, from the first fingerprint record.
    #[default]
    First,
    /// One row per fingerprint record, all sharing the endpoint's probe data.
    Every,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollisionPolicy::KeepLast => "keep-last",
            CollisionPolicy::KeepFirst => "keep-first",
            CollisionPolicy::CollectAll => "collect-all",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub collisions: CollisionPolicy,
    pub cluster_mode: ClusterMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Distinct endpoints in the fingerprint source.
    pub clusters: usize,
    /// Clusters collapsed into a single https row.
    pub collapsed: usize,
    /// Clusters that found probe data.
    pub matched: usize,
    pub fingerprint_only: usize,
    pub probe_only: usize,
    /// Probe records that shared an endpoint with an earlier one.
    pub probe_collisions: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub records: Vec<MergedRecord>,
    pub stats: MergeStats,
}

/// Merge both sources into endpoint-keyed rows.
pub fn reconcile(
    fingerprints: &[FingerprintRecord],
    probes: &[ProbeRecord],
    opts: &ReconcileOptions,
) -> Reconciliation {
    let index = index::ProbeIndex::build(probes, opts.collisions);
    let mut claimed: HashSet<Endpoint> = HashSet::new();
    let mut records = Vec::with_capacity(fingerprints.len());
    let mut stats = MergeStats { probe_collisions: index.collisions, ..Default::default() };

    for c in cluster::group(fingerprints) {
        stats.clusters += 1;
        let probe = index.get(&c.endpoint);
        if probe.is_some() {
            stats.matched += 1;
            claimed.insert(c.endpoint.clone());
        } else {
            stats.fingerprint_only += 1;
        }

        if let Some(https) = c.redirect_target() {
            debug!(endpoint = %c.endpoint, records = c.records.len(), "collapsing bare-http/https pair");
            let mut row = MergedRecord::from_fingerprint(https).with_probe(probe);
            row.protocol = Some("https".to_string());
            records.push(row);
            stats.collapsed += 1;
            continue;
        }

        match opts.cluster_mode {
            ClusterMode::First => {
                if let Some(first) = c.records.first() {
                    records.push(MergedRecord::from_fingerprint(first).with_probe(probe));
                }
            }
            ClusterMode::Every => {
                records.extend(c.records.iter().map(|fp| MergedRecord::from_fingerprint(fp).with_probe(probe)));
            }
        }
    }

    for (endpoint, fields) in index.iter() {
        if !claimed.contains(endpoint) {
            records.push(MergedRecord::probe_only(endpoint, fields));
            stats.probe_only += 1;
        }
    }

    Reconciliation { records, stats }
}
