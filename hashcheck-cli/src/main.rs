use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hashcheck_core::{DigestMode, HashAlgorithm, RunReport, VerifyConfig, Verifier};

mod render;
mod signals;

use render::Renderer;

#[derive(Parser)]
#[command(name = "hashcheck", version, about = "Verify files against a CRC.* checksum manifest")]
struct Cli {
    /// Directory searched for a CRC.<ext> manifest
    #[arg(default_value = ".")]
    dir: PathBuf,
    /// Verify this manifest instead of searching DIR
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// TOML file with verification settings
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long)]
    chunk_size: Option<usize>,
    #[arg(long)]
    progress_interval_ms: Option<u64>,
    /// Refuse CityHash128 files larger than this many bytes
    #[arg(long)]
    full_buffer_limit: Option<u64>,
    /// Print the final report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    /// No progress bars; only corrupted and missing files are listed
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
    /// Print supported manifest formats and exit
    #[arg(long, default_value_t = false)]
    list_formats: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn verify_config(&self) -> Result<VerifyConfig> {
        let mut cfg = match &self.config {
            Some(path) => VerifyConfig::from_toml_file(path)?,
            None => VerifyConfig::default(),
        };
        if let Some(n) = self.workers {
            cfg.max_workers = n;
        }
        if let Some(n) = self.chunk_size {
            cfg.chunk_size = n;
        }
        if let Some(ms) = self.progress_interval_ms {
            cfg.progress_interval_ms = ms;
        }
        if self.full_buffer_limit.is_some() {
            cfg.full_buffer_limit = self.full_buffer_limit;
        }
        cfg.validate().context("invalid settings")?;
        Ok(cfg)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    if cli.list_formats {
        list_formats();
        return ExitCode::SUCCESS;
    }
    match run(&cli) {
        Ok(report) if report.all_ok() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = cli.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hashcheck={level},hashcheck_core={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<RunReport> {
    let cfg = cli.verify_config()?;
    debug!(?cfg, "settings");

    let (tx, rx) = crossbeam_channel::unbounded();
    let verifier = Verifier::new(cfg, Arc::new(tx));
    signals::install(verifier.stop_handle())?;
    let handle = match &cli.manifest {
        Some(path) => verifier.start_manifest(path.clone())?,
        None => verifier.start(cli.dir.clone())?,
    };
    // the run thread holds the last sender; the channel closes when it ends
    drop(verifier);

    let mut renderer = Renderer::new(cli.quiet || cli.json);
    for event in rx.iter() {
        renderer.handle(event);
    }
    renderer.finish();

    let report = handle.join()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(report)
}

fn list_formats() {
    for algo in HashAlgorithm::ALL {
        let note = match algo.mode() {
            DigestMode::FullBuffer => ", whole file in memory",
            DigestMode::Streaming => "",
        };
        println!(
            "CRC.{:<8} {:<12} {} hex digits{}",
            algo.extension(),
            algo.name(),
            algo.digest_hex_len(),
            note
        );
    }
}
