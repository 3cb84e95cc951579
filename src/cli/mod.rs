//! CLI module - Command line interface definitions and handlers

pub mod output;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// sector-hound - Offline forensic triage of raw disk images
///
/// Parses partition tables, hunts hidden and encrypted regions, carves file
/// headers and flags extension spoofing. All operations are READ-ONLY.
#[derive(Parser, Debug)]
#[command(name = "sector-hound")]
#[command(version)]
#[command(about = "🔎 Offline forensic triage of raw disk images", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an image for hidden partitions, filesystems and encrypted regions
    Scan(ScanArgs),

    /// Print the MBR partition table
    Partitions(PartitionsArgs),

    /// Carve file headers from the start of an image
    Carve(CarveArgs),

    /// Check a file's extension against its magic bytes
    Spoof(SpoofArgs),

    /// Classify a single window of an image
    Classify(ClassifyArgs),

    /// Triage files: type, spoofing, hashes, strings
    Triage(TriageArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Human,
    /// JSON document with run metadata
    Json,
}

#[derive(Debug, Clone, Parser)]
pub struct ImageArgs {
    /// Raw disk image (dd, img, raw) or block device
    #[arg(required = true)]
    pub image: PathBuf,

    /// Memory-map the image instead of positional reads
    #[arg(long)]
    pub mmap: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: ImageArgs,

    /// Scan mode: quick, standard, paranoid (default from config)
    #[arg(long, short)]
    pub mode: Option<String>,

    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct PartitionsArgs {
    #[command(flatten)]
    pub source: ImageArgs,

    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct CarveArgs {
    #[command(flatten)]
    pub source: ImageArgs,

    /// Bytes examined from the start of the image (default from config)
    #[arg(long)]
    pub window: Option<usize>,

    /// Maximum number of candidates (default from config)
    #[arg(long)]
    pub max: Option<usize>,

    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct SpoofArgs {
    /// File to check
    #[arg(required = true)]
    pub file: PathBuf,

    /// Claimed extension (default: the file's own extension)
    #[arg(long)]
    pub claimed: Option<String>,

    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub source: ImageArgs,

    /// Byte offset of the window
    #[arg(long, default_value = "0")]
    pub offset: u64,

    /// Window length in bytes
    #[arg(long, default_value = "512")]
    pub length: usize,

    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct TriageArgs {
    /// Files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of parallel workers (default from config, 0 = CPU count)
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// Do not descend into subdirectories
    #[arg(long)]
    pub no_recursive: bool,

    /// Include hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Create the config file with commented defaults
    #[arg(long)]
    pub init: bool,

    /// Print the effective configuration
    #[arg(long)]
    pub show: bool,

    /// Print the commented sample configuration
    #[arg(long)]
    pub sample: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["sector-hound", "scan", "disk.dd", "--mode", "paranoid", "-f", "json"]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.source.image, PathBuf::from("disk.dd"));
                assert_eq!(args.mode.as_deref(), Some("paranoid"));
                assert_eq!(args.format, OutputFormat::Json);
                assert!(!args.source.mmap);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["sector-hound", "partitions", "disk.dd", "-v", "--log-json"]);
        assert!(cli.verbose);
        assert!(cli.log_json);
    }

    #[test]
    fn test_triage_multiple_paths() {
        let cli = Cli::parse_from(["sector-hound", "triage", "a", "b", "--workers", "2"]);
        match cli.command {
            Commands::Triage(args) => {
                assert_eq!(args.paths.len(), 2);
                assert_eq!(args.workers, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
