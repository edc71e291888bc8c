use scanmerge_core::MergedRecord;
use std::io::Write;

use crate::ExportError;

/// Header row plus one row per record; absent values are empty cells.
pub fn write_csv<W: Write>(records: &[MergedRecord], out: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(MergedRecord::COLUMNS)?;
    for r in records {
        wtr.write_record(r.cells().iter().map(|(_, cell)| cell.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}
