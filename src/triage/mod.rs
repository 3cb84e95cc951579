//! File triage - per-file type identification, spoofing, hashes and strings.
//!
//! Walks the given paths with `walkdir`, then analyzes files in parallel on a
//! dedicated rayon pool. A file that cannot be read is reported as a failure
//! and does not stop the batch.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::classify::{self, EntropyClass};
use crate::error::{ForensicError, Result};
use crate::hashing::{self, FileHashes};
use crate::readonly;
use crate::spoof::{self, SpoofingDetector, SpoofingVerdict};
use crate::strings::{self, StringReport};

/// Leading bytes examined for type, entropy and strings
pub const DEFAULT_HEADER_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageOptions {
    /// Worker threads, 0 = one per CPU
    pub workers: usize,
    pub header_bytes: usize,
    pub min_string_len: usize,
    pub skip_hidden: bool,
    pub recursive: bool,
}

impl Default for TriageOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            header_bytes: DEFAULT_HEADER_BYTES,
            min_string_len: strings::DEFAULT_MIN_LEN,
            skip_hidden: true,
            recursive: true,
        }
    }
}

impl TriageOptions {
    fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub claimed_extension: String,
    /// Type label from the magic-byte catalog
    pub actual_type: Option<String>,
    pub mime_type: Option<String>,
    /// e.g. `"4D 5A"`
    pub magic_bytes: Option<String>,
    /// Second opinion from `infer`
    pub infer_mime: Option<String>,
    /// MIME implied by the claimed extension
    pub claimed_mime: Option<String>,
    pub spoofing: SpoofingVerdict,
    pub hashes: FileHashes,
    pub strings: StringReport,
    pub entropy: f64,
    pub entropy_class: EntropyClass,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageSummary {
    pub files: Vec<FileReport>,
    pub failures: Vec<TriageFailure>,
    pub spoofed: usize,
    pub bytes_total: u64,
    pub duration_ms: u64,
}

/// Expand `roots` into the regular files to triage, in walk order
pub fn collect_files(roots: &[PathBuf], options: &TriageOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in roots {
        let mut walker = WalkDir::new(root).follow_links(false);
        if !options.recursive {
            walker = walker.max_depth(1);
        }

        let skip_hidden = options.skip_hidden;
        let root_path = root.clone();
        files.extend(
            walker
                .into_iter()
                .filter_entry(move |e| !skip_hidden || e.path() == root_path || !is_hidden(e))
                .filter_map(|e| match e {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        tracing::warn!(error = %err, "Skipping unreadable entry");
                        None
                    }
                })
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path()),
        );
    }

    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn read_header(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let file = readonly::open_readonly(path).map_err(|e| ForensicError::io(0, e))?;
    let mut header = Vec::new();
    file.take(limit as u64)
        .read_to_end(&mut header)
        .map_err(|e| ForensicError::io(0, e))?;
    Ok(header)
}

/// Analyze one file
pub fn triage_file(path: &Path, options: &TriageOptions) -> Result<FileReport> {
    let metadata = std::fs::metadata(path).map_err(|e| ForensicError::io(0, e))?;
    let header = read_header(path, options.header_bytes)?;

    let claimed = path
        .extension()
        .map(|e| spoof::normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default();

    let actual = classify::classify_file_type(&header);
    let spoofing = SpoofingDetector.judge(&claimed, actual);
    let entropy = classify::entropy(&header);

    let report = FileReport {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: metadata.len(),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        actual_type: actual.map(|s| s.label.to_string()),
        mime_type: actual.map(|s| s.mime_type.to_string()),
        magic_bytes: actual.map(|s| s.magic_hex()),
        infer_mime: infer::get(&header).map(|k| k.mime_type().to_string()),
        claimed_mime: mime_guess::from_ext(&claimed)
            .first()
            .map(|m| m.essence_str().to_string()),
        claimed_extension: claimed,
        spoofing,
        hashes: hashing::hash_file(path)?,
        strings: strings::extract_strings(&header, options.min_string_len),
        entropy,
        entropy_class: EntropyClass::from_entropy(entropy),
    };

    if report.spoofing.is_spoofed {
        tracing::warn!(
            path = %path.display(),
            claimed = %report.claimed_extension,
            actual = %report.spoofing.actual_type_label,
            risk = %report.spoofing.risk_level,
            "Spoofed file"
        );
    }

    Ok(report)
}

/// Triage every file under `roots`. `on_file` runs on worker threads after
/// each file, successful or not.
pub fn triage_paths<F>(roots: &[PathBuf], options: &TriageOptions, on_file: F) -> TriageSummary
where
    F: Fn(&Path) + Send + Sync,
{
    let start = Instant::now();
    let paths = collect_files(roots, options);
    let workers = options.worker_count();

    tracing::info!(files = paths.len(), workers, "Starting file triage");

    let analyze = || -> Vec<(PathBuf, Result<FileReport>)> {
        paths
            .par_iter()
            .map(|p| {
                let outcome = triage_file(p, options);
                on_file(p);
                (p.clone(), outcome)
            })
            .collect()
    };

    let outcomes = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(analyze),
        Err(e) => {
            tracing::warn!(error = %e, "Could not build triage pool, using global pool");
            analyze()
        }
    };

    let mut summary = TriageSummary::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                summary.bytes_total += report.size;
                if report.spoofing.is_spoofed {
                    summary.spoofed += 1;
                }
                summary.files.push(report);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Triage failed");
                summary.failures.push(TriageFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
    summary.duration_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        analyzed = summary.files.len(),
        failed = summary.failures.len(),
        spoofed = summary.spoofed,
        duration_ms = summary.duration_ms,
        "File triage complete"
    );

    summary
}
