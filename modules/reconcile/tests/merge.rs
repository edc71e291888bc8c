use std::io::Cursor;
use std::path::PathBuf;

use ingest::{load_path, load_reader, LoadReport};
use reconcile::{reconcile, CollisionPolicy, ReconcileOptions};
use scanmerge_core::{Endpoint, FingerprintRecord, MergedRecord, ProbeRecord};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixtures() -> (LoadReport<FingerprintRecord>, LoadReport<ProbeRecord>) {
    let dir = fixtures_dir();
    let fps = load_path(&dir.join("dismap.json")).unwrap();
    let probes = load_path(&dir.join("httpx.json")).unwrap();
    (fps, probes)
}

fn row<'a>(rows: &'a [MergedRecord], host: &str, port: u16) -> &'a MergedRecord {
    rows.iter()
        .find(|r| r.endpoint() == Endpoint::new(host, port))
        .unwrap_or_else(|| panic!("no row for {host}:{port}"))
}

#[test]
fn fixtures_load_with_skips() {
    let (fps, probes) = load_fixtures();
    assert_eq!(fps.records.len(), 5);
    assert_eq!(fps.malformed, 1);
    assert_eq!(fps.invalid, 1);
    assert_eq!(probes.records.len(), 3);
    assert_eq!(probes.malformed, 1);
    assert_eq!(probes.invalid, 1);
}

#[test]
fn fixtures_merge() {
    let (fps, probes) = load_fixtures();
    let out = reconcile(&fps.records, &probes.records, &ReconcileOptions::default());
    assert_eq!(out.records.len(), 4);
    assert_eq!(out.stats.clusters, 3);
    assert_eq!(out.stats.collapsed, 1);
    assert_eq!(out.stats.matched, 2);
    assert_eq!(out.stats.fingerprint_only, 1);
    assert_eq!(out.stats.probe_only, 1);

    let tls = row(&out.records, "192.168.1.10", 8443);
    assert_eq!(tls.protocol.as_deref(), Some("https"));
    assert_eq!(tls.identify_string.as_deref(), Some("[200] [nginx]"));
    assert_eq!(tls.title.as_deref(), Some("Admin Console"));
    assert_eq!(tls.tech.as_deref(), Some("Nginx Vue.js"));
    assert_eq!(tls.content_length, Some(5120));

    let ssh = row(&out.records, "192.168.1.10", 22);
    assert_eq!(ssh.protocol.as_deref(), Some("ssh"));
    assert_eq!(ssh.url, None);

    // "080" and 80 are the same endpoint; the first record wins.
    let web = row(&out.records, "192.168.1.11", 80);
    assert_eq!(web.identify_string.as_deref(), Some("[200] [Apache]"));
    assert_eq!(web.tech.as_deref(), Some("Apache HTTP Server"));

    let tail = out.records.last().unwrap();
    assert_eq!(tail.endpoint(), Endpoint::new("192.168.1.12", 9000));
    assert!(!tail.has_fingerprint());
    assert_eq!(tail.title.as_deref(), Some("Portainer"));
    assert_eq!(tail.tech, None);
    assert_eq!(tail.status_code, Some(302));
}

#[test]
fn remerge_against_empty_probe_source_is_stable() {
    let (fps, probes) = load_fixtures();
    let first = reconcile(&fps.records, &probes.records, &ReconcileOptions::default());

    let mut ndjson = Vec::new();
    for r in &first.records {
        ndjson.extend(serde_json::to_vec(r).unwrap());
        ndjson.push(b'\n');
    }
    let reloaded: LoadReport<FingerprintRecord> = load_reader(Cursor::new(ndjson), "merged").unwrap();
    assert_eq!(reloaded.skipped(), 0);

    let second = reconcile(&reloaded.records, &[], &ReconcileOptions::default());
    assert_eq!(second.records.len(), first.records.len());
    for (a, b) in first.records.iter().zip(&second.records) {
        assert_eq!(a.endpoint(), b.endpoint());
        assert_eq!(a.identify_string, b.identify_string);
        assert_eq!(a.protocol, b.protocol);
        assert_eq!(a.banner_string, b.banner_string);
    }
}

#[test]
fn collect_all_over_fixture_duplicates() {
    let probes_ndjson = concat!(
        r#"{"host":"h","port":80,"title":"One","tech":["nginx"]}"#, "\n",
        r#"{"host":"h","port":"80","title":"Two","tech":["nginx","php"]}"#, "\n",
    );
    let probes: LoadReport<ProbeRecord> = load_reader(Cursor::new(probes_ndjson), "inline").unwrap();
    let opts = ReconcileOptions { collisions: CollisionPolicy::CollectAll, ..Default::default() };
    let out = reconcile(&[], &probes.records, &opts);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].title.as_deref(), Some("One | Two"));
    assert_eq!(out.records[0].tech.as_deref(), Some("nginx php"));
    assert_eq!(out.stats.probe_collisions, 1);
}
