//! Command handlers

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use super::output;
use super::{
    CarveArgs, ClassifyArgs, Commands, ConfigArgs, ImageArgs, OutputFormat, PartitionsArgs,
    ScanArgs, SpoofArgs, TriageArgs,
};
use crate::carve::{CarveOptions, FileCarver};
use crate::classify::WindowReport;
use crate::config::{self, Config};
use crate::partition;
use crate::progress::{CancelFlag, NoProgress, ProgressSink};
use crate::readonly;
use crate::scan::{HiddenSectorFinding, ScanMode, SectorScanner};
use crate::source::{self, ByteSource, OpenMode};
use crate::spoof::{self, SpoofingDetector};
use crate::triage::{self, TriageOptions};

/// Bytes read from a file for the spoofing check
const SPOOF_HEADER_BYTES: u64 = 4096;

/// Dispatch a parsed command
pub async fn execute(command: Commands, config: &Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Scan(args) => run_scan(args, config).await,
        Commands::Partitions(args) => run_partitions(args, config),
        Commands::Carve(args) => run_carve(args, config).await,
        Commands::Spoof(args) => run_spoof(args),
        Commands::Classify(args) => run_classify(args, config),
        Commands::Triage(args) => run_triage(args, config).await,
        Commands::Config(args) => run_config(args, config, config_path),
    }
}

fn open_source(args: &ImageArgs, config: &Config) -> Result<Box<dyn ByteSource>> {
    if config.general.warn_if_writable {
        readonly::warn_if_writable(&args.image);
    }

    let mode = if args.mmap || config.general.use_mmap {
        OpenMode::Mmap
    } else {
        OpenMode::File
    };

    source::open_image(&args.image, mode)
        .with_context(|| format!("Failed to open image: {}", args.image.display()))
}

fn percent_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("█▓▒░"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

/// Drives an indicatif bar and logs findings as they arrive
struct BarSink {
    pb: ProgressBar,
}

impl ProgressSink for BarSink {
    fn progress(&self, percent: f64, message: &str) {
        self.pb.set_position(percent.round() as u64);
        self.pb.set_message(message.to_string());
    }

    fn on_finding(&self, finding: &HiddenSectorFinding) {
        tracing::debug!(
            sector = finding.sector,
            classification = ?finding.classification,
            label = %finding.label,
            "Finding"
        );
    }
}

/// Raise `flag` on Ctrl-C
fn cancel_on_ctrl_c(flag: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            flag.cancel();
        }
    });
}

async fn run_scan(args: ScanArgs, config: &Config) -> Result<()> {
    let mode: ScanMode = match &args.mode {
        Some(m) => m.parse()?,
        None => config.scan.default_mode,
    };

    let image = open_source(&args.source, config)?;
    let cancel = CancelFlag::new();
    cancel_on_ctrl_c(cancel.clone());

    let scanner = SectorScanner::new(config.scan.clone()).with_cancel(cancel);

    let show_progress = !args.no_progress && args.format == OutputFormat::Human;
    let outcome = if show_progress {
        let sink = BarSink { pb: percent_bar()? };
        let outcome = scanner.scan(image.as_ref(), mode, &sink).await;
        match &outcome {
            Ok(_) => sink.pb.finish_with_message("Scan complete"),
            Err(_) => sink.pb.abandon_with_message("Scan aborted"),
        }
        outcome
    } else {
        scanner.scan(image.as_ref(), mode, &NoProgress).await
    };
    let result = outcome
        .with_context(|| format!("{} scan of {} failed", mode, args.source.image.display()))?;

    match args.format {
        OutputFormat::Human => output::print_scan(&args.source.image, &result),
        OutputFormat::Json => output::print_json(Some(&args.source.image), &result)?,
    }
    Ok(())
}

fn run_partitions(args: PartitionsArgs, config: &Config) -> Result<()> {
    let image = open_source(&args.source, config)?;
    let partitions = partition::partitions_or_empty(image.as_ref())
        .with_context(|| format!("Failed to read MBR of {}", args.source.image.display()))?;

    match args.format {
        OutputFormat::Human => {
            println!("\n{} {}\n", "🗂".bright_cyan(), args.source.image.display());
            output::print_partitions(&partitions);
        }
        OutputFormat::Json => output::print_json(Some(&args.source.image), &partitions)?,
    }
    Ok(())
}

async fn run_carve(args: CarveArgs, config: &Config) -> Result<()> {
    let options = CarveOptions {
        window_bytes: args.window.unwrap_or(config.carve.window_bytes),
        max_candidates: args.max.unwrap_or(config.carve.max_candidates),
        ..config.carve.clone()
    };

    let image = open_source(&args.source, config)?;
    let cancel = CancelFlag::new();
    cancel_on_ctrl_c(cancel.clone());
    let carver = FileCarver::new(options).with_cancel(cancel);

    let outcome = if args.format == OutputFormat::Human {
        let sink = BarSink { pb: percent_bar()? };
        let outcome = carver.carve_source(image.as_ref(), &sink).await;
        sink.pb.finish_and_clear();
        outcome
    } else {
        carver.carve_source(image.as_ref(), &NoProgress).await
    };
    let (candidates, window) =
        outcome.with_context(|| format!("Carve of {} failed", args.source.image.display()))?;

    let assessed = carver.assess(&candidates, &window);

    match args.format {
        OutputFormat::Human => output::print_carve(&args.source.image, &assessed),
        OutputFormat::Json => output::print_json(Some(&args.source.image), &assessed)?,
    }
    Ok(())
}

fn run_spoof(args: SpoofArgs) -> Result<()> {
    let file = readonly::open_readonly(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let mut header = Vec::new();
    file.take(SPOOF_HEADER_BYTES)
        .read_to_end(&mut header)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let claimed = args.claimed.clone().unwrap_or_else(|| {
        args.file
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let verdict = SpoofingDetector::new().detect(&claimed, &header);

    match args.format {
        OutputFormat::Human => output::print_verdict(&args.file, &verdict),
        OutputFormat::Json => output::print_json(Some(&args.file), &verdict)?,
    }

    if verdict.is_spoofed && verdict.risk_level >= spoof::RiskLevel::High {
        tracing::warn!(file = %args.file.display(), risk = %verdict.risk_level, "High-risk spoofed file");
    }
    Ok(())
}

fn run_classify(args: ClassifyArgs, config: &Config) -> Result<()> {
    let image = open_source(&args.source, config)?;
    let window = image
        .read_range(args.offset, args.length)
        .with_context(|| format!("Failed to read window at {:#x}", args.offset))?;

    let report = WindowReport::analyze(args.offset, &window);
    match args.format {
        OutputFormat::Human => output::print_window(&report),
        OutputFormat::Json => output::print_json(Some(&args.source.image), &report)?,
    }
    Ok(())
}

async fn run_triage(args: TriageArgs, config: &Config) -> Result<()> {
    let options = TriageOptions {
        workers: args.workers.unwrap_or(config.triage.workers),
        recursive: config.triage.recursive && !args.no_recursive,
        skip_hidden: config.triage.skip_hidden && !args.include_hidden,
        ..config.triage.clone()
    };

    let roots: Vec<PathBuf> = args.paths.clone();
    let total = triage::collect_files(&roots, &options).len() as u64;

    let pb = if args.format == OutputFormat::Human {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("█▓▒░"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let worker_pb = pb.clone();
    let summary = tokio::task::spawn_blocking(move || {
        triage::triage_paths(&roots, &options, |_| worker_pb.inc(1))
    })
    .await
    .context("Triage worker panicked")?;
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Human => output::print_triage(&summary),
        OutputFormat::Json => output::print_json(None, &summary)?,
    }
    Ok(())
}

fn run_config(args: ConfigArgs, config: &Config, path: &Path) -> Result<()> {
    if args.sample {
        print!("{}", config::generate_sample_config());
        return Ok(());
    }

    if args.init {
        let existed = path.exists();
        Config::ensure_exists(path)?;
        if existed {
            println!("{} Config already exists: {}", "ℹ".bright_cyan(), path.display());
        } else {
            println!("{} Created {}", "✓".bright_green(), path.display());
        }
        return Ok(());
    }

    if args.show {
        print!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
        return Ok(());
    }

    let state = if path.exists() {
        "exists".green()
    } else {
        "not created (using defaults)".dimmed()
    };
    println!("Config file: {} [{}]", path.display(), state);
    Ok(())
}
