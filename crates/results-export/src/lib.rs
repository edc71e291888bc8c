//! Writers for merged scan rows: xlsx, csv and JSON Lines.

mod delimited;
mod format;
mod jsonl;
#[cfg(feature = "xlsx")]
mod xlsx;

pub use delimited::write_csv;
pub use format::{output_path, timestamped_name, ExportFormat};
pub use jsonl::write_jsonl;
#[cfg(feature = "xlsx")]
pub use xlsx::write_xlsx;

use scanmerge_core::MergedRecord;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "xlsx")]
    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("xlsx output is not available in this build (enable the `xlsx` feature)")]
    XlsxDisabled,
}

/// Write `records` to `path` in `format`, creating parent directories.
/// Returns the path actually written, which may gain an extension.
pub fn export(records: &[MergedRecord], path: &Path, format: ExportFormat) -> Result<PathBuf, ExportError> {
    let path = output_path(path, format);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Create { path: parent.to_path_buf(), source })?;
    }
    match format {
        ExportFormat::Csv => write_csv(records, create(&path)?)?,
        ExportFormat::Jsonl => write_jsonl(records, create(&path)?)?,
        #[cfg(feature = "xlsx")]
        ExportFormat::Xlsx => write_xlsx(records, &path)?,
        #[cfg(not(feature = "xlsx"))]
        ExportFormat::Xlsx => return Err(ExportError::XlsxDisabled),
    }
    debug!(path = %path.display(), %format, rows = records.len(), "export written");
    Ok(path)
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Create { path: path.to_path_buf(), source })
}
