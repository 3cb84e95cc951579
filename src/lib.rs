//! sector-hound library
//!
//! Offline forensic triage of raw disk images - MBR partition parsing,
//! three-phase sector scanning for hidden and encrypted regions, heuristic
//! file carving and extension spoofing detection.
//!
//! # Features
//!
//! - **Read-Only Safe**: images are only ever opened for reading
//! - **Any Byte Source**: engine needs only `len()` and `read_range()`
//! - **Escalating Scans**: Quick, Standard and Paranoid modes trade coverage for time
//! - **Cooperative**: scans yield between checkpoints and honor a cancel flag
//!
//! # Example
//!
//! ```no_run
//! use sector_hound::{scan, FileSource, LogSink, ScanMode};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let image = FileSource::open(Path::new("evidence.dd"))?;
//!     let result = scan::scan(&image, ScanMode::Standard, &LogSink).await?;
//!
//!     println!("{} findings in {} sectors", result.total_findings(), result.total_sectors);
//!     Ok(())
//! }
//! ```

pub mod carve;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod hashing;
pub mod partition;
pub mod progress;
pub mod readonly;
pub mod scan;
pub mod source;
pub mod spoof;
pub mod strings;
pub mod triage;

// Re-export commonly used types
pub use carve::{carve as carve_buffer, CarveOptions, CarvedFileCandidate, FileCarver};
pub use classify::{classify_file_type, classify_filesystem, entropy, is_all_zero, ByteSignature, Confidence};
pub use config::Config;
pub use error::{ForensicError, Result};
pub use partition::{parse_mbr, PartitionEntry, PartitionStatus};
pub use progress::{CancelFlag, ChannelSink, LogSink, NoProgress, ProgressEvent, ProgressSink};
pub use scan::{Classification, HiddenSectorFinding, ScanMode, ScanOptions, ScanResult, SectorScanner};
pub use source::{ByteSource, FileSource, MemorySource, MmapSource};
pub use spoof::{RiskLevel, SpoofingDetector, SpoofingVerdict};
