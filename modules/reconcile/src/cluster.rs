use scanmerge_core::{Endpoint, FingerprintRecord, ScanRecord};
use std::collections::HashMap;

/// What a fingerprinter reports for a plain-HTTP request answered with 400 on a TLS port.
pub const BARE_HTTP_MARKER: &str = "[400]";

/// Fingerprint records sharing one endpoint, in input order. Never empty.
pub(crate) struct Cluster<'a> {
    pub endpoint: Endpoint,
    pub records: Vec<&'a FingerprintRecord>,
}

impl<'a> Cluster<'a> {
    /// The https record to collapse into, when the cluster is a bare-http 400 / https pair.
    pub fn redirect_target(&self) -> Option<&'a FingerprintRecord> {
        let bare_http = self
            .records
            .iter()
            .any(|r| r.is_protocol("http") && r.identify_string.as_deref() == Some(BARE_HTTP_MARKER));
        if !bare_http {
            return None;
        }
        self.records.iter().rev().find(|r| r.is_protocol("https")).copied()
    }
}

/// Group records by endpoint, clusters ordered by first appearance.
pub(crate) fn group(fingerprints: &[FingerprintRecord]) -> Vec<Cluster<'_>> {
    let mut clusters: Vec<Cluster<'_>> = Vec::new();
    let mut slot: HashMap<Endpoint, usize> = HashMap::new();
    for fp in fingerprints {
        let key = fp.endpoint();
        match slot.get(&key) {
            Some(&i) => clusters[i].records.push(fp),
            None => {
                slot.insert(key.clone(), clusters.len());
                clusters.push(Cluster { endpoint: key, records: vec![fp] });
            }
        }
    }
    clusters
}
