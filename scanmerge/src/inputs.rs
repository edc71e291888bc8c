//! Resolving the two input files: explicit path, default name, or an interactive prompt.

use anyhow::{anyhow, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_FINGERPRINT: &str = "dismap.json";
pub const DEFAULT_PROBE: &str = "httpx.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{0} is not a JSON file (.json or .jsonl)")]
    NotJson(String),
    #[error("{0} does not exist")]
    Missing(String),
}

pub fn validate_input(path: &Path) -> Result<(), InputError> {
    let shown = path.display().to_string();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json") || e.eq_ignore_ascii_case("jsonl"));
    if !is_json {
        return Err(InputError::NotJson(shown));
    }
    if !path.is_file() {
        return Err(InputError::Missing(shown));
    }
    Ok(())
}

/// One input to resolve.
pub struct InputSpec<'a> {
    /// Human name, e.g. "fingerprint".
    pub label: &'a str,
    pub given: Option<PathBuf>,
    pub default: &'a str,
}

/// Explicit paths must be valid. A missing default falls back to prompting when allowed.
pub fn resolve<R: BufRead, W: Write>(spec: InputSpec<'_>, prompt: Option<(&mut R, &mut W)>) -> Result<PathBuf> {
    if let Some(p) = spec.given {
        validate_input(&p).map_err(|e| anyhow!("{} input: {e}", spec.label))?;
        return Ok(p);
    }
    let default = PathBuf::from(spec.default);
    if default.is_file() {
        return Ok(default);
    }
    match prompt {
        Some((input, out)) => {
            writeln!(out, "default {} file {} not found", spec.label, spec.default)?;
            prompt_until_valid(spec.label, input, out)
        }
        None => Err(anyhow!(
            "default {} file {} not found; pass --{} <FILE>",
            spec.label,
            spec.default,
            spec.label
        )),
    }
}

/// Ask until the answer names an existing JSON file. Fails when input ends.
pub fn prompt_until_valid<R: BufRead, W: Write>(label: &str, input: &mut R, out: &mut W) -> Result<PathBuf> {
    let mut line = String::new();
    loop {
        write!(out, "{label} JSON file: ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(anyhow!("no {label} file given (input closed)"));
        }
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        let p = PathBuf::from(answer);
        match validate_input(&p) {
            Ok(()) => return Ok(p),
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn validation_rules() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("scan.json");
        std::fs::write(&ok, "{}\n").unwrap();
        assert!(validate_input(&ok).is_ok());
        assert!(matches!(validate_input(&dir.path().join("scan.txt")), Err(InputError::NotJson(_))));
        assert!(matches!(validate_input(&dir.path().join("gone.jsonl")), Err(InputError::Missing(_))));
        // a directory named like a json file is still not an input
        let d = dir.path().join("dir.json");
        std::fs::create_dir(&d).unwrap();
        assert!(matches!(validate_input(&d), Err(InputError::Missing(_))));
    }

    #[test]
    fn prompt_loops_until_valid() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("httpx.json");
        std::fs::write(&good, "").unwrap();
        let answers = format!("\nnotes.txt\n{}\n{}\n", dir.path().join("missing.json").display(), good.display());
        let mut input = Cursor::new(answers.into_bytes());
        let mut out = Vec::new();
        let got = prompt_until_valid("probe", &mut input, &mut out).unwrap();
        assert_eq!(got, good);
        let transcript = String::from_utf8(out).unwrap();
        assert_eq!(transcript.matches("error:").count(), 2);
    }

    #[test]
    fn prompt_fails_on_eof() {
        let mut input = Cursor::new(b"bad.txt\n".to_vec());
        let mut out = Vec::new();
        assert!(prompt_until_valid("fingerprint", &mut input, &mut out).is_err());
    }

    #[test]
    fn explicit_path_is_validated_without_prompt() {
        let spec = InputSpec { label: "probe", given: Some(PathBuf::from("scan.csv")), default: DEFAULT_PROBE };
        let err = resolve::<Cursor<Vec<u8>>, Vec<u8>>(spec, None).unwrap_err();
        assert!(err.to_string().contains("not a JSON file"));
    }

    #[test]
    fn missing_default_without_prompt_errors() {
        let spec = InputSpec { label: "fingerprint", given: None, default: "definitely-not-here-4f1c.json" };
        let err = resolve::<Cursor<Vec<u8>>, Vec<u8>>(spec, None).unwrap_err();
        assert!(err.to_string().contains("--fingerprint"));
    }

    #[test]
    fn missing_default_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("dismap.json");
        std::fs::write(&good, "").unwrap();
        let mut input = Cursor::new(format!("{}\n", good.display()).into_bytes());
        let mut out = Vec::new();
        let spec = InputSpec { label: "fingerprint", given: None, default: "definitely-not-here-4f1c.json" };
        let got = resolve(spec, Some((&mut input, &mut out))).unwrap();
        assert_eq!(got, good);
        assert!(String::from_utf8(out).unwrap().starts_with("default fingerprint file"));
    }
}
