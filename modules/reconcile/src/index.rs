use scanmerge_core::{Endpoint, ProbeFields, ProbeRecord, ScanRecord};
use std::collections::HashMap;
use tracing::debug;

use crate::CollisionPolicy;

/// Probe data keyed by endpoint, in first-observation order.
///
/// Lookups never remove entries; which keys were claimed by fingerprint clusters is tracked by
/// the caller.
pub(crate) struct ProbeIndex {
    order: Vec<Endpoint>,
    entries: HashMap<Endpoint, ProbeFields>,
    pub collisions: usize,
}

impl ProbeIndex {
    pub fn build(probes: &[ProbeRecord], policy: CollisionPolicy) -> Self {
        let mut order = Vec::new();
        let mut grouped: HashMap<Endpoint, Vec<&ProbeRecord>> = HashMap::new();
        let mut collisions = 0;
        for p in probes {
            let key = p.endpoint();
            match grouped.get_mut(&key) {
                Some(seen) => {
                    collisions += 1;
                    debug!(endpoint = %key, policy = %policy, "duplicate probe record");
                    seen.push(p);
                }
                None => {
                    order.push(key.clone());
                    grouped.insert(key, vec![p]);
                }
            }
        }

        let entries = grouped
            .into_iter()
            .filter_map(|(key, recs)| {
                let fields = match policy {
                    CollisionPolicy::KeepLast => recs.last().map(|r| ProbeFields::from(*r)),
                    CollisionPolicy::KeepFirst => recs.first().map(|r| ProbeFields::from(*r)),
                    CollisionPolicy::CollectAll => Some(ProbeFields::collect(recs)),
                }?;
                Some((key, fields))
            })
            .collect();

        ProbeIndex { order, entries, collisions }
    }

    pub fn get(&self, key: &Endpoint) -> Option<&ProbeFields> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Endpoint, &ProbeFields)> {
        self.order.iter().filter_map(move |k| self.entries.get(k).map(|f| (k, f)))
    }
}
