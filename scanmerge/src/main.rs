use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use reconcile::{ClusterMode, CollisionPolicy, ReconcileOptions};
use results_export::ExportFormat;
use std::io::IsTerminal;
use std::path::PathBuf;
use time::OffsetDateTime;

mod config;
mod inputs;
mod logging;
mod pipeline;

use inputs::{InputSpec, DEFAULT_FINGERPRINT, DEFAULT_PROBE};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Xlsx, Csv, Jsonl }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Collisions { KeepLast, KeepFirst, CollectAll }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Rows { First, Every }

impl From<OutputFormat> for ExportFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Xlsx => ExportFormat::Xlsx,
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Jsonl => ExportFormat::Jsonl,
        }
    }
}

impl From<Collisions> for CollisionPolicy {
    fn from(c: Collisions) -> Self {
        match c {
            Collisions::KeepLast => CollisionPolicy::KeepLast,
            Collisions::KeepFirst => CollisionPolicy::KeepFirst,
            Collisions::CollectAll => CollisionPolicy::CollectAll,
        }
    }
}

impl From<Rows> for ClusterMode {
    fn from(r: Rows) -> Self {
        match r {
            Rows::First => ClusterMode::First,
            Rows::Every => ClusterMode::Every,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "scanmerge", version, about = "Merge fingerprint and HTTP probe scan results per endpoint")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./scanmerge.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Debug-level diagnostics (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Merge a fingerprint NDJSON file with an HTTP probe NDJSON file
    Merge {
        /// Fingerprint results, one JSON object per line (default: ./dismap.json)
        #[arg(long, value_name = "FILE")]
        fingerprint: Option<PathBuf>,
        /// HTTP probe results, one JSON object per line (default: ./httpx.json)
        #[arg(long, value_name = "FILE")]
        probe: Option<PathBuf>,
        /// Output file (default: merged_data_<timestamp>.<ext>)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Output format. Inferred from --out when omitted.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// How duplicate probe records for one endpoint are combined
        #[arg(long, value_enum)]
        collisions: Option<Collisions>,
        /// Rows per endpoint: first (one row per endpoint) or every (one per fingerprint record)
        #[arg(long, value_enum)]
        cluster_mode: Option<Rows>,
        /// Never prompt for missing input files
        #[arg(long, default_value_t = false)]
        no_prompt: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let loaded_cfg = config::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Version => {
            println!("scanmerge {} (core {})", env!("CARGO_PKG_VERSION"), scanmerge_core::version());
        }
        Commands::Merge { fingerprint, probe, out, format, collisions, cluster_mode, no_prompt } => {
            let args = config::MergeArgs {
                fingerprint,
                probe,
                out,
                format: format.map(Into::into),
                collisions: collisions.map(Into::into),
                cluster_mode: cluster_mode.map(Into::into),
                prompt: !no_prompt,
            }
            .with_config(loaded_cfg.as_ref().and_then(|c| c.merge.as_ref()));

            let interactive = args.prompt && std::io::stdin().is_terminal();
            let fingerprint = resolve_input("fingerprint", args.fingerprint, DEFAULT_FINGERPRINT, interactive)?;
            let probe = resolve_input("probe", args.probe, DEFAULT_PROBE, interactive)?;

            let format = args
                .format
                .or_else(|| args.out.as_deref().and_then(ExportFormat::from_path))
                .unwrap_or_default();
            let out = args.out.unwrap_or_else(|| {
                let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
                PathBuf::from(results_export::timestamped_name("merged_data", format, now))
            });

            let opts = pipeline::PipelineOptions {
                fingerprint,
                probe,
                out,
                format,
                reconcile: ReconcileOptions {
                    collisions: args.collisions.unwrap_or_default(),
                    cluster_mode: args.cluster_mode.unwrap_or_default(),
                },
            };
            let summary = pipeline::run(&opts).context("merge failed")?;
            println!(
                "fingerprint: {} loaded, {} malformed, {} invalid",
                summary.fingerprint.loaded, summary.fingerprint.malformed, summary.fingerprint.invalid
            );
            println!(
                "probe: {} loaded, {} malformed, {} invalid",
                summary.probe.loaded, summary.probe.malformed, summary.probe.invalid
            );
            println!(
                "merged: {} records ({} redirect pairs collapsed, {} fingerprint-only, {} probe-only) -> {}",
                summary.merged,
                summary.stats.collapsed,
                summary.stats.fingerprint_only,
                summary.stats.probe_only,
                summary.output.display()
            );
        }
    }
    Ok(())
}

fn resolve_input(label: &str, given: Option<PathBuf>, default: &str, interactive: bool) -> Result<PathBuf> {
    let spec = InputSpec { label, given, default };
    if interactive {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut out = std::io::stderr();
        inputs::resolve(spec, Some((&mut input, &mut out)))
    } else {
        inputs::resolve::<std::io::StdinLock<'static>, std::io::Stderr>(spec, None)
    }
}
