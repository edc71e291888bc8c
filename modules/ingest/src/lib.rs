//! Newline-delimited JSON loading for scanner output.
//!
//! Every non-blank line is parsed and validated into a typed record. Bad lines are logged and
//! counted, never fatal; only failing to open or read the file is an error.

use scanmerge_core::{RecordError, ScanRecord};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin}: read failed after line {line}: {source}")]
    Read {
        origin: String,
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Records loaded from one source plus what had to be skipped.
#[derive(Debug)]
pub struct LoadReport<R> {
    pub records: Vec<R>,
    /// Non-blank lines seen.
    pub lines: usize,
    /// Lines that were not a JSON object.
    pub malformed: usize,
    /// JSON objects rejected as records (missing host/port, bad port).
    pub invalid: usize,
}

impl<R> LoadReport<R> {
    pub fn skipped(&self) -> usize {
        self.malformed + self.invalid
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R> Default for LoadReport<R> {
    fn default() -> Self {
        LoadReport { records: Vec::new(), lines: 0, malformed: 0, invalid: 0 }
    }
}

enum LineError {
    Malformed(String),
    Invalid(RecordError),
}

/// Load an NDJSON file of `R` records.
pub fn load_path<R: ScanRecord>(path: &Path) -> Result<LoadReport<R>, IngestError> {
    let fh = File::open(path).map_err(|source| IngestError::Open { path: path.to_path_buf(), source })?;
    let report = load_reader(BufReader::new(fh), &path.display().to_string())?;
    debug!(source = R::SOURCE, path = %path.display(), records = report.records.len(), "loaded");
    Ok(report)
}

/// Load `R` records from any buffered reader. `origin` names the input in diagnostics.
pub fn load_reader<R: ScanRecord, B: BufRead>(reader: B, origin: &str) -> Result<LoadReport<R>, IngestError> {
    let mut report = LoadReport::default();
    for (idx, chunk) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let bytes = chunk.map_err(|source| IngestError::Read { origin: origin.to_string(), line: idx, source })?;
        let bytes = if idx == 0 { strip_bom(&bytes) } else { &bytes[..] };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        report.lines += 1;
        match parse_line::<R>(bytes) {
            Ok(rec) => report.records.push(rec),
            Err(LineError::Malformed(e)) => {
                warn!(source = R::SOURCE, origin, line = line_no, error = %e, "skipping malformed line");
                report.malformed += 1;
            }
            Err(LineError::Invalid(e)) => {
                warn!(source = R::SOURCE, origin, line = line_no, error = %e, "skipping invalid record");
                report.invalid += 1;
            }
        }
    }
    Ok(report)
}

fn parse_line<R: ScanRecord>(bytes: &[u8]) -> Result<R, LineError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| LineError::Malformed(e.to_string()))?;
    R::from_json(value).map_err(|e| match e {
        RecordError::NotAnObject => LineError::Malformed(e.to_string()),
        other => LineError::Invalid(other),
    })
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}
