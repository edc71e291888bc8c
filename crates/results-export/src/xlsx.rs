use rust_xlsxwriter::{Format, Workbook};
use scanmerge_core::{Cell, MergedRecord};
use std::borrow::Cow;
use std::path::Path;

use crate::ExportError;

// Excel's per-cell text limit.
const MAX_CELL_CHARS: usize = 32_767;

/// Single sheet with a frozen bold header. Ports and counts are numeric cells.
pub fn write_xlsx(records: &[MergedRecord], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet().set_name("merged")?;

    for (col, name) in MergedRecord::COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (i, r) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, (_, cell)) in r.cells().iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(row, col, sanitize(s))?;
                }
                Cell::Number(n) => {
                    sheet.write_number(row, col, *n as f64)?;
                }
                Cell::Empty => {}
            }
        }
    }
    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();

    workbook.save(path)?;
    Ok(())
}

/// Drop control characters XML cannot carry and clamp to the cell limit.
fn sanitize(s: &str) -> Cow<'_, str> {
    let bad = |c: char| c.is_control() && !matches!(c, '\t' | '\n' | '\r');
    if !s.chars().any(bad) && s.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| !bad(*c)).take(MAX_CELL_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_controls() {
        assert_eq!(sanitize("ok\r\nline"), "ok\r\nline");
        assert_eq!(sanitize("a\u{0}b\u{1b}c"), "abc");
        assert_eq!(sanitize(&"x".repeat(40_000)).chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.xlsx");
        let rows = vec![MergedRecord {
            host: "10.0.0.1".into(),
            port: 443,
            banner_string: Some("HTTP/1.1 200 OK\r\n\u{0}".into()),
            status_code: Some(200),
            ..Default::default()
        }];
        write_xlsx(&rows, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
