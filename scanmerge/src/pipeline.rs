//! Load both sources, reconcile, export.

use ingest::LoadReport;
use reconcile::{reconcile, MergeStats, ReconcileOptions};
use results_export::{ExportError, ExportFormat};
use scanmerge_core::{FingerprintRecord, ProbeRecord, ScanRecord};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{kind} source {} unavailable: {reason}", .path.display())]
    SourceUnavailable {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error("merge produced no records; nothing written")]
    EmptyMergeResult,
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub fingerprint: PathBuf,
    pub probe: PathBuf,
    pub out: PathBuf,
    pub format: ExportFormat,
    pub reconcile: ReconcileOptions,
}

#[derive(Debug, Clone)]
pub struct SourceCounts {
    pub loaded: usize,
    pub malformed: usize,
    pub invalid: usize,
}

impl<R> From<&LoadReport<R>> for SourceCounts {
    fn from(r: &LoadReport<R>) -> Self {
        SourceCounts { loaded: r.records.len(), malformed: r.malformed, invalid: r.invalid }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub fingerprint: SourceCounts,
    pub probe: SourceCounts,
    pub merged: usize,
    pub stats: MergeStats,
    pub output: PathBuf,
}

pub fn run(opts: &PipelineOptions) -> Result<RunSummary, PipelineError> {
    let fps = load_source::<FingerprintRecord>(&opts.fingerprint)?;
    let probes = load_source::<ProbeRecord>(&opts.probe)?;

    let merged = reconcile(&fps.records, &probes.records, &opts.reconcile);
    info!(
        records = merged.records.len(),
        collapsed = merged.stats.collapsed,
        matched = merged.stats.matched,
        fingerprint_only = merged.stats.fingerprint_only,
        probe_only = merged.stats.probe_only,
        "merge complete"
    );
    if merged.stats.probe_collisions > 0 {
        warn!(
            duplicates = merged.stats.probe_collisions,
            policy = %opts.reconcile.collisions,
            "probe source has several records for some endpoints"
        );
    }
    if merged.records.is_empty() {
        error!("merge produced no records");
        return Err(PipelineError::EmptyMergeResult);
    }

    let output = results_export::export(&merged.records, &opts.out, opts.format)?;
    info!(path = %output.display(), format = %opts.format, "wrote merged records");

    Ok(RunSummary {
        fingerprint: SourceCounts::from(&fps),
        probe: SourceCounts::from(&probes),
        merged: merged.records.len(),
        stats: merged.stats,
        output,
    })
}

/// An unreadable file and a file without a single usable record both abort the run.
fn load_source<R: ScanRecord>(path: &Path) -> Result<LoadReport<R>, PipelineError> {
    let unavailable = |reason: String| {
        error!(source = R::SOURCE, path = %path.display(), %reason, "source unavailable");
        PipelineError::SourceUnavailable { kind: R::SOURCE, path: path.to_path_buf(), reason }
    };
    info!(source = R::SOURCE, path = %path.display(), "reading");
    let report = ingest::load_path::<R>(path).map_err(|e| unavailable(e.to_string()))?;
    if report.is_empty() {
        return Err(unavailable(format!("no usable records ({} skipped)", report.skipped())));
    }
    info!(
        source = R::SOURCE,
        loaded = report.records.len(),
        malformed = report.malformed,
        invalid = report.invalid,
        "loaded"
    );
    Ok(report)
}
