use anyhow::{Context, Result};
use reconcile::{ClusterMode, CollisionPolicy};
use results_export::ExportFormat;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "scanmerge.yaml";

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    pub fingerprint: Option<PathBuf>,
    pub probe: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub format: Option<ExportFormat>,
    pub collisions: Option<CollisionPolicy>,
    pub cluster_mode: Option<ClusterMode>,
    /// Set to false to never prompt for missing inputs.
    pub prompt: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub merge: Option<MergeConfig>,
}

/// Load an explicit config file, or `./scanmerge.yaml` when it exists.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&s).with_context(|| format!("parsing config {}", path.display())).map(Some)
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(s)?)
}

/// `merge` settings as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeArgs {
    pub fingerprint: Option<PathBuf>,
    pub probe: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub format: Option<ExportFormat>,
    pub collisions: Option<CollisionPolicy>,
    pub cluster_mode: Option<ClusterMode>,
    pub prompt: bool,
}

impl MergeArgs {
    /// Fill unset flags from the config file. `--no-prompt` and `prompt: false` both disable prompting.
    pub fn with_config(mut self, cfg: Option<&MergeConfig>) -> Self {
        let Some(m) = cfg else { return self };
        if self.fingerprint.is_none() { self.fingerprint = m.fingerprint.clone(); }
        if self.probe.is_none() { self.probe = m.probe.clone(); }
        if self.out.is_none() { self.out = m.out.clone(); }
        if self.format.is_none() { self.format = m.format; }
        if self.collisions.is_none() { self.collisions = m.collisions; }
        if self.cluster_mode.is_none() { self.cluster_mode = m.cluster_mode; }
        if m.prompt == Some(false) { self.prompt = false; }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_merge_section() {
        let cfg = parse_config(
            "merge:\n  fingerprint: scans/dismap.json\n  probe: scans/httpx.json\n  format: csv\n  collisions: collect-all\n  cluster_mode: every\n  prompt: false\n",
        )
        .unwrap();
        let m = cfg.merge.unwrap();
        assert_eq!(m.fingerprint, Some(PathBuf::from("scans/dismap.json")));
        assert_eq!(m.format, Some(ExportFormat::Csv));
        assert_eq!(m.collisions, Some(CollisionPolicy::CollectAll));
        assert_eq!(m.cluster_mode, Some(ClusterMode::Every));
        assert_eq!(m.prompt, Some(false));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(parse_config("merge:\n  collision: keep-first\n").is_err());
    }

    #[test]
    fn cli_values_win_over_config() {
        let cfg = parse_config("merge:\n  probe: cfg-httpx.json\n  out: cfg.xlsx\n  collisions: keep-first\n").unwrap();
        let args = MergeArgs {
            fingerprint: None,
            probe: Some(PathBuf::from("cli-httpx.json")),
            out: None,
            format: None,
            collisions: None,
            cluster_mode: None,
            prompt: true,
        }
        .with_config(cfg.merge.as_ref());
        assert_eq!(args.probe, Some(PathBuf::from("cli-httpx.json")));
        assert_eq!(args.out, Some(PathBuf::from("cfg.xlsx")));
        assert_eq!(args.collisions, Some(CollisionPolicy::KeepFirst));
        assert_eq!(args.fingerprint, None);
        assert!(args.prompt);
    }

    #[test]
    fn config_can_disable_prompt() {
        let cfg = parse_config("merge:\n  prompt: false\n").unwrap();
        let args = MergeArgs {
            fingerprint: None,
            probe: None,
            out: None,
            format: None,
            collisions: None,
            cluster_mode: None,
            prompt: true,
        }
        .with_config(cfg.merge.as_ref());
        assert!(!args.prompt);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.yaml"))).is_err());
    }
}
