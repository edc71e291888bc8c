use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Jsonl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Jsonl => "jsonl",
        }
    }

    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(ExportFormat::Xlsx),
            "csv" => Some(ExportFormat::Csv),
            "jsonl" | "ndjson" | "json" => Some(ExportFormat::Jsonl),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Spreadsheets always get an `.xlsx` extension; other formats are written where asked.
pub fn output_path(path: &Path, format: ExportFormat) -> PathBuf {
    let has_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if format == ExportFormat::Xlsx && !has_xlsx {
        let mut s = path.as_os_str().to_os_string();
        s.push(".xlsx");
        PathBuf::from(s)
    } else {
        path.to_path_buf()
    }
}

/// `<prefix>_YYYYmmdd_HHMMSS.<ext>` so repeated runs never overwrite each other.
pub fn timestamped_name(prefix: &str, format: ExportFormat, at: OffsetDateTime) -> String {
    let stamp = at
        .format(format_description!("[year][month][day]_[hour][minute][second]"))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("{prefix}_{stamp}.{}", format.extension())
}
