use scanmerge_core::MergedRecord;
use std::io::Write;

use crate::ExportError;

/// One JSON object per line. The output can be loaded back as a fingerprint source.
pub fn write_jsonl<W: Write>(records: &[MergedRecord], mut out: W) -> Result<(), ExportError> {
    for r in records {
        serde_json::to_writer(&mut out, r)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn one_object_per_line_without_nulls() {
        let rows = vec![
            MergedRecord { host: "a".into(), port: 80, tech: Some("nginx php".into()), ..Default::default() },
            MergedRecord { host: "b".into(), port: 22, protocol: Some("ssh".into()), ..Default::default() },
        ];
        let mut buf = Vec::new();
        write_jsonl(&rows, &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let parsed: Vec<Value> = s.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["tech"], "nginx php");
        assert!(parsed[0].get("protocol").is_none());
        assert_eq!(parsed[1]["port"], 22);
    }
}
