//! Sector scanner - three-phase escalating search for hidden regions.
//!
//! 1. Sector 0: partition table and volume boot record.
//! 2. A fixed list of hiding-spot sectors used by vendor tooling to tuck
//!    partitions away on removable media.
//! 3. A strided sweep over the image (Standard, Paranoid only).
//!
//! Each mode trades coverage for time: Quick stops after phase 2, Standard
//! samples every 64th sector of the first 100k, Paranoid reads every sector
//! and also runs entropy analysis on each one.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::classify::{self, Confidence};
use crate::error::{ForensicError, Result};
use crate::partition::{self, PartitionEntry};
use crate::progress::{CancelFlag, ProgressSink};
use crate::source::ByteSource;

/// Sectors probed in phase 2 (U3 launchers, alternate boot areas, GPT headers)
pub const DEFAULT_HIDING_SPOTS: [u64; 5] = [32, 64, 128, 256, 2048];

/// Sectors read at each hiding spot
pub const PROBE_WINDOW_SECTORS: usize = 16;

/// Window read per sampled sector during the sweep
pub const SWEEP_WINDOW_BYTES: usize = 1024;

pub const STANDARD_STRIDE: u64 = 64;
pub const STANDARD_SECTOR_CAP: u64 = 100_000;
pub const PARANOID_STRIDE: u64 = 1;

/// Sweep sectors between progress checkpoints
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Share of the progress bar reserved for phases 1 and 2
const SWEEP_PROGRESS_START: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Sector 0 and hiding spots only
    Quick,
    /// Plus a strided, capped sweep without entropy analysis
    #[default]
    Standard,
    /// Plus an exhaustive sweep with entropy analysis of every sector
    Paranoid,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Quick => "quick",
            ScanMode::Standard => "standard",
            ScanMode::Paranoid => "paranoid",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = ForensicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(ScanMode::Quick),
            "standard" => Ok(ScanMode::Standard),
            "paranoid" => Ok(ScanMode::Paranoid),
            _ => Err(ForensicError::InvalidModeParameter(s.to_string())),
        }
    }
}

/// Scanner tuning. Defaults reproduce the reference thresholds exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Mode used when the caller does not pick one
    pub default_mode: ScanMode,
    pub hiding_spots: Vec<u64>,
    pub probe_window_sectors: usize,
    pub sector_size: usize,
    pub sweep_window_bytes: usize,
    pub standard_stride: u64,
    pub standard_sector_cap: u64,
    pub paranoid_stride: u64,
    /// Bits per byte above which a window is encrypted or compressed
    pub entropy_threshold: f64,
    pub progress_interval: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            default_mode: ScanMode::Standard,
            hiding_spots: DEFAULT_HIDING_SPOTS.to_vec(),
            probe_window_sectors: PROBE_WINDOW_SECTORS,
            sector_size: partition::SECTOR_SIZE,
            sweep_window_bytes: SWEEP_WINDOW_BYTES,
            standard_stride: STANDARD_STRIDE,
            standard_sector_cap: STANDARD_SECTOR_CAP,
            paranoid_stride: PARANOID_STRIDE,
            entropy_threshold: classify::ENCRYPTED_ENTROPY_THRESHOLD,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl ScanOptions {
    /// Stride and sector bound of the phase-3 sweep, `None` for Quick
    pub fn sweep_plan(&self, mode: ScanMode, total_sectors: u64) -> Option<(u64, u64)> {
        match mode {
            ScanMode::Quick => None,
            ScanMode::Standard => Some((
                self.standard_stride.max(1),
                total_sectors.min(self.standard_sector_cap),
            )),
            ScanMode::Paranoid => Some((self.paranoid_stride.max(1), total_sectors)),
        }
    }

    fn sector_size(&self) -> u64 {
        self.sector_size.max(1) as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    FilesystemSignature,
    PotentialHiddenPartition,
    EncryptedOrCompressed,
    ContainsData,
    /// All-zero window; such windows are skipped and never reported
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenSectorFinding {
    pub sector: u64,
    pub byte_offset: u64,
    pub classification: Classification,
    pub confidence: Confidence,
    pub entropy: Option<f64>,
    pub matched_signature: Option<String>,
    /// Short description (`NTFS`, `High Entropy`, `Unknown Data`)
    pub label: String,
}

/// Findings of one scan, bucketed by classification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub hidden_partitions: Vec<HiddenSectorFinding>,
    pub filesystem_signatures: Vec<HiddenSectorFinding>,
    pub suspicious_sectors: Vec<HiddenSectorFinding>,
    pub encrypted_regions: Vec<HiddenSectorFinding>,
    pub scan_progress_percent: f64,
    pub total_sectors: u64,
    /// MBR partition table read during phase 1
    pub partitions: Vec<PartitionEntry>,
}

impl ScanResult {
    fn new(total_sectors: u64) -> Self {
        Self {
            total_sectors,
            ..Default::default()
        }
    }

    /// File a finding into the single bucket its classification owns
    fn record(&mut self, finding: HiddenSectorFinding) {
        let bucket = match finding.classification {
            Classification::FilesystemSignature => &mut self.filesystem_signatures,
            Classification::PotentialHiddenPartition => &mut self.hidden_partitions,
            Classification::EncryptedOrCompressed => &mut self.encrypted_regions,
            Classification::ContainsData => &mut self.suspicious_sectors,
            Classification::Empty => return,
        };
        bucket.push(finding);
    }

    pub fn total_findings(&self) -> usize {
        self.hidden_partitions.len()
            + self.filesystem_signatures.len()
            + self.suspicious_sectors.len()
            + self.encrypted_regions.len()
    }

    /// All findings, bucket by bucket
    pub fn findings(&self) -> impl Iterator<Item = &HiddenSectorFinding> {
        self.hidden_partitions
            .iter()
            .chain(&self.filesystem_signatures)
            .chain(&self.suspicious_sectors)
            .chain(&self.encrypted_regions)
    }
}

/// Three-phase sector scanner over a [`ByteSource`]
#[derive(Debug, Clone, Default)]
pub struct SectorScanner {
    options: ScanOptions,
    cancel: CancelFlag,
}

impl SectorScanner {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            cancel: CancelFlag::new(),
        }
    }

    /// Check `flag` at every yield point
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Run a full scan.
    ///
    /// A read failure aborts the scan with [`ForensicError::IoFailure`] and no
    /// result; findings already produced have been delivered to
    /// `sink.on_finding`.
    pub async fn scan(
        &self,
        image: &dyn ByteSource,
        mode: ScanMode,
        sink: &dyn ProgressSink,
    ) -> Result<ScanResult> {
        let started = Instant::now();
        let sector_size = self.options.sector_size();
        let total_sectors = image.len() / sector_size;
        let mut run = ScanRun {
            result: ScanResult::new(total_sectors),
            sink,
            last_percent: 0.0,
        };

        tracing::info!(
            image_size = image.len(),
            total_sectors,
            mode = %mode,
            "Starting sector scan"
        );

        self.scan_boot_sector(image, &mut run)?;
        self.probe_hiding_spots(image, &mut run).await?;

        if let Some((stride, cap)) = self.options.sweep_plan(mode, total_sectors) {
            self.sweep(image, mode, stride, cap, &mut run).await?;
        }

        run.report(100.0, "Scan complete");
        run.result.scan_progress_percent = 100.0;

        tracing::info!(
            findings = run.result.total_findings(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sector scan finished"
        );

        Ok(run.result)
    }

    /// Phase 1
    fn scan_boot_sector(&self, image: &dyn ByteSource, run: &mut ScanRun<'_>) -> Result<()> {
        run.report(0.0, "Reading MBR partition table...");

        run.result.partitions = partition::partitions_or_empty(image)?;

        let sector = image.read_range(0, self.options.sector_size)?;
        if let Some(fs) = classify::classify_filesystem(&sector) {
            run.record(HiddenSectorFinding {
                sector: 0,
                byte_offset: 0,
                classification: Classification::FilesystemSignature,
                confidence: fs.confidence,
                entropy: None,
                matched_signature: Some(fs.label.to_string()),
                label: fs.label.to_string(),
            });
        }

        Ok(())
    }

    /// Phase 2
    async fn probe_hiding_spots(&self, image: &dyn ByteSource, run: &mut ScanRun<'_>) -> Result<()> {
        run.report(5.0, "Scanning common hiding spots...");

        let sector_size = self.options.sector_size();
        let window_len = self.options.probe_window_sectors * self.options.sector_size;
        let spots = &self.options.hiding_spots;

        for (i, &sector) in spots.iter().enumerate() {
            self.checkpoint().await?;

            let offset = sector.saturating_mul(sector_size);
            let window = image.read_range(offset, window_len)?;

            if !window.is_empty() && !classify::is_all_zero(&window) {
                let finding = self.classify_hiding_spot(sector, offset, &window);
                tracing::debug!(
                    sector,
                    classification = ?finding.classification,
                    "Hiding spot holds data"
                );
                run.record(finding);
            }

            let percent = 5.0 + (i + 1) as f64 / spots.len() as f64 * 15.0;
            run.report(percent, &format!("Checked hiding spot at sector {}", sector));
        }

        Ok(())
    }

    fn classify_hiding_spot(&self, sector: u64, offset: u64, window: &[u8]) -> HiddenSectorFinding {
        let h = classify::entropy(window);

        let (classification, confidence, matched, label) = if let Some(fs) = classify::classify_filesystem(window) {
            (
                Classification::PotentialHiddenPartition,
                fs.confidence,
                Some(fs.label.to_string()),
                fs.label.to_string(),
            )
        } else if h > self.options.entropy_threshold {
            (
                Classification::EncryptedOrCompressed,
                Confidence::Medium,
                None,
                "Encrypted/Compressed".to_string(),
            )
        } else {
            (Classification::ContainsData, Confidence::Low, None, "Unknown Data".to_string())
        };

        HiddenSectorFinding {
            sector,
            byte_offset: offset,
            classification,
            confidence,
            entropy: Some(h),
            matched_signature: matched,
            label,
        }
    }

    /// Phase 3
    async fn sweep(
        &self,
        image: &dyn ByteSource,
        mode: ScanMode,
        stride: u64,
        cap: u64,
        run: &mut ScanRun<'_>,
    ) -> Result<()> {
        let sector_size = self.options.sector_size();
        let interval = self.options.progress_interval.max(1);
        let check_entropy = mode == ScanMode::Paranoid;

        tracing::debug!(stride, cap, check_entropy, "Sweeping sectors");

        let mut sector = 0u64;
        while sector < cap {
            if sector % interval == 0 {
                let percent = SWEEP_PROGRESS_START + sector as f64 / cap as f64 * 80.0;
                run.report(percent, &format!("Scanning sector {}/{}...", sector, cap));
                self.checkpoint().await?;
            }

            let offset = sector * sector_size;
            let window = image.read_range(offset, self.options.sweep_window_bytes)?;
            if window.is_empty() {
                break;
            }

            if !classify::is_all_zero(&window) {
                if let Some(fs) = classify::classify_filesystem(&window) {
                    // Sector 0 belongs to phase 1
                    if sector > 0 {
                        run.record(HiddenSectorFinding {
                            sector,
                            byte_offset: offset,
                            classification: Classification::FilesystemSignature,
                            confidence: fs.confidence,
                            entropy: None,
                            matched_signature: Some(fs.label.to_string()),
                            label: fs.label.to_string(),
                        });
                    }
                } else if check_entropy {
                    let h = classify::entropy(&window);
                    if h > self.options.entropy_threshold {
                        run.record(HiddenSectorFinding {
                            sector,
                            byte_offset: offset,
                            classification: Classification::EncryptedOrCompressed,
                            confidence: Confidence::Medium,
                            entropy: Some(h),
                            matched_signature: None,
                            label: "High Entropy".to_string(),
                        });
                    }
                }
            }

            sector += stride;
        }

        Ok(())
    }

    async fn checkpoint(&self) -> Result<()> {
        tokio::task::yield_now().await;
        if self.cancel.is_cancelled() {
            tracing::info!("Sector scan cancelled");
            return Err(ForensicError::Cancelled);
        }
        Ok(())
    }
}

/// Mutable state of one scan call
struct ScanRun<'a> {
    result: ScanResult,
    sink: &'a dyn ProgressSink,
    last_percent: f64,
}

impl ScanRun<'_> {
    fn report(&mut self, percent: f64, message: &str) {
        let percent = percent.clamp(self.last_percent, 100.0);
        self.last_percent = percent;
        self.result.scan_progress_percent = percent;
        self.sink.progress(percent, message);
    }

    fn record(&mut self, finding: HiddenSectorFinding) {
        self.sink.on_finding(&finding);
        self.result.record(finding);
    }
}

/// Scan with default options
pub async fn scan(image: &dyn ByteSource, mode: ScanMode, sink: &dyn ProgressSink) -> Result<ScanResult> {
    SectorScanner::default().scan(image, mode, sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NoProgress, RecordingSink};
    use crate::source::MemorySource;

    const SECTOR: usize = 512;

    fn ntfs_vbr() -> Vec<u8> {
        let mut s = vec![0u8; SECTOR];
        s[0..3].copy_from_slice(&[0xEB, 0x52, 0x90]);
        s[3..11].copy_from_slice(b"NTFS    ");
        s[510] = 0x55;
        s[511] = 0xAA;
        s
    }

    /// Deterministic bytes with entropy close to 8
    fn noise(len: usize, seed: u32) -> Vec<u8> {
        let mut x = seed.wrapping_mul(2_654_435_761).max(1);
        (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                (x >> 24) as u8
            })
            .collect()
    }

    fn put(img: &mut [u8], sector: usize, bytes: &[u8]) {
        let off = sector * SECTOR;
        img[off..off + bytes.len()].copy_from_slice(bytes);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Quick".parse::<ScanMode>().unwrap(), ScanMode::Quick);
        assert_eq!(" paranoid ".parse::<ScanMode>().unwrap(), ScanMode::Paranoid);
        let err = "turbo".parse::<ScanMode>().unwrap_err();
        assert!(matches!(err, ForensicError::InvalidModeParameter(ref m) if m == "turbo"));
    }

    #[test]
    fn test_sweep_plan() {
        let opts = ScanOptions::default();
        assert_eq!(opts.sweep_plan(ScanMode::Quick, 1_000_000), None);
        assert_eq!(opts.sweep_plan(ScanMode::Standard, 1_000_000), Some((64, 100_000)));
        assert_eq!(opts.sweep_plan(ScanMode::Standard, 5_000), Some((64, 5_000)));
        assert_eq!(opts.sweep_plan(ScanMode::Paranoid, 1_000_000), Some((1, 1_000_000)));
    }

    #[tokio::test]
    async fn test_empty_image() {
        let result = scan(&MemorySource::new(Vec::new()), ScanMode::Paranoid, &NoProgress)
            .await
            .unwrap();
        assert_eq!(result.total_sectors, 0);
        assert_eq!(result.total_findings(), 0);
        assert_eq!(result.scan_progress_percent, 100.0);
    }

    #[tokio::test]
    async fn test_boot_sector_filesystem() {
        let mut img = vec![0u8; 64 * SECTOR];
        put(&mut img, 0, &ntfs_vbr());

        let result = scan(&MemorySource::new(img), ScanMode::Standard, &NoProgress)
            .await
            .unwrap();

        assert_eq!(result.filesystem_signatures.len(), 1);
        let f = &result.filesystem_signatures[0];
        assert_eq!(f.sector, 0);
        assert_eq!(f.confidence, Confidence::High);
        assert_eq!(f.matched_signature.as_deref(), Some("NTFS"));
        assert!(f.entropy.is_none());
    }

    #[tokio::test]
    async fn test_hiding_spot_buckets() {
        let mut img = vec![0u8; 4096 * SECTOR];
        put(&mut img, 32, &ntfs_vbr());
        put(&mut img, 64, &noise(16 * SECTOR, 7));
        put(&mut img, 128, b"hello, hidden world");

        let result = scan(&MemorySource::new(img), ScanMode::Quick, &NoProgress)
            .await
            .unwrap();

        assert_eq!(result.hidden_partitions.len(), 1);
        assert_eq!(result.hidden_partitions[0].sector, 32);
        assert_eq!(result.hidden_partitions[0].classification, Classification::PotentialHiddenPartition);

        assert_eq!(result.encrypted_regions.len(), 1);
        assert_eq!(result.encrypted_regions[0].sector, 64);
        assert_eq!(result.encrypted_regions[0].confidence, Confidence::Medium);
        assert!(result.encrypted_regions[0].entropy.unwrap() > 7.5);

        assert_eq!(result.suspicious_sectors.len(), 1);
        assert_eq!(result.suspicious_sectors[0].sector, 128);
        assert_eq!(result.suspicious_sectors[0].confidence, Confidence::Low);
        assert_eq!(result.suspicious_sectors[0].label, "Unknown Data");
    }

    #[tokio::test]
    async fn test_hiding_spot_past_end_is_skipped() {
        // 100 sectors: only spots 32 and 64 lie inside the image
        let mut img = vec![0u8; 100 * SECTOR];
        put(&mut img, 64, b"data");
        let result = scan(&MemorySource::new(img), ScanMode::Quick, &NoProgress)
            .await
            .unwrap();
        assert_eq!(result.suspicious_sectors.len(), 1);
        assert_eq!(result.suspicious_sectors[0].sector, 64);
    }

    #[tokio::test]
    async fn test_quick_mode_skips_sweep() {
        let mut img = vec![0u8; 4096 * SECTOR];
        put(&mut img, 640, &ntfs_vbr());

        let quick = scan(&MemorySource::new(img.clone()), ScanMode::Quick, &NoProgress)
            .await
            .unwrap();
        assert!(quick.filesystem_signatures.is_empty());

        let standard = scan(&MemorySource::new(img), ScanMode::Standard, &NoProgress)
            .await
            .unwrap();
        assert_eq!(standard.filesystem_signatures.len(), 1);
        assert_eq!(standard.filesystem_signatures[0].sector, 640);
        assert_eq!(standard.filesystem_signatures[0].byte_offset, 640 * 512);
    }

    #[tokio::test]
    async fn test_standard_skips_entropy_paranoid_does_not() {
        let mut img = vec![0u8; 4096 * SECTOR];
        // Off-stride for Standard, not a hiding spot
        put(&mut img, 1001, &noise(2 * SECTOR, 3));

        let standard = scan(&MemorySource::new(img.clone()), ScanMode::Standard, &NoProgress)
            .await
            .unwrap();
        assert!(standard.encrypted_regions.is_empty());

        let paranoid = scan(&MemorySource::new(img), ScanMode::Paranoid, &NoProgress)
            .await
            .unwrap();
        assert!(paranoid.encrypted_regions.iter().any(|f| f.sector == 1001));
        assert!(paranoid
            .encrypted_regions
            .iter()
            .all(|f| f.label == "High Entropy" && f.confidence == Confidence::Medium));
    }

    #[tokio::test]
    async fn test_paranoid_does_not_double_count_sector_zero() {
        let mut img = vec![0u8; 8 * SECTOR];
        put(&mut img, 0, &ntfs_vbr());
        let result = scan(&MemorySource::new(img), ScanMode::Paranoid, &NoProgress)
            .await
            .unwrap();
        assert_eq!(result.filesystem_signatures.len(), 1);
        assert!(result.encrypted_regions.is_empty());
    }

    #[tokio::test]
    async fn test_high_entropy_volume_is_filesystem_only() {
        let mut img = vec![0u8; 4096 * SECTOR];
        let mut vbr = noise(2 * SECTOR, 5);
        vbr[3..11].copy_from_slice(b"NTFS    ");
        put(&mut img, 3000, &vbr);
        assert!(classify::entropy(&vbr) > classify::ENCRYPTED_ENTROPY_THRESHOLD);

        let result = scan(&MemorySource::new(img), ScanMode::Paranoid, &NoProgress)
            .await
            .unwrap();

        let at_3000: Vec<_> = result.findings().filter(|f| f.sector == 3000).collect();
        assert_eq!(at_3000.len(), 1);
        assert_eq!(at_3000[0].classification, Classification::FilesystemSignature);
        assert_eq!(at_3000[0].matched_signature.as_deref(), Some("NTFS"));
        assert!(result.filesystem_signatures.iter().any(|f| f.sector == 3000));
        assert!(!result.encrypted_regions.iter().any(|f| f.sector == 3000));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_100() {
        let mut img = vec![0u8; 20_000 * SECTOR];
        put(&mut img, 2048, &noise(16 * SECTOR, 11));

        for mode in [ScanMode::Quick, ScanMode::Standard, ScanMode::Paranoid] {
            let sink = RecordingSink::new();
            scan(&MemorySource::new(img.clone()), mode, &sink).await.unwrap();

            let percents = sink.percents();
            assert_eq!(percents.first().copied(), Some(0.0));
            assert_eq!(percents.last().copied(), Some(100.0));
            assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{mode}: {percents:?}");
            assert!(percents.iter().all(|p| (0.0..=100.0).contains(p)));
        }
    }

    #[tokio::test]
    async fn test_findings_streamed_to_sink() {
        let mut img = vec![0u8; 4096 * SECTOR];
        put(&mut img, 256, b"payload");
        let sink = RecordingSink::new();
        let result = scan(&MemorySource::new(img), ScanMode::Quick, &sink).await.unwrap();
        assert_eq!(sink.findings().len(), result.total_findings());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let flag = CancelFlag::new();
        flag.cancel();
        let scanner = SectorScanner::default().with_cancel(flag);
        let err = scanner
            .scan(&MemorySource::new(vec![1u8; 4096 * SECTOR]), ScanMode::Standard, &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ForensicError::Cancelled));
    }

    #[tokio::test]
    async fn test_custom_hiding_spots() {
        let mut img = vec![0u8; 64 * SECTOR];
        put(&mut img, 10, b"custom spot");
        let scanner = SectorScanner::new(ScanOptions {
            hiding_spots: vec![10],
            ..Default::default()
        });
        let result = scanner
            .scan(&MemorySource::new(img), ScanMode::Quick, &NoProgress)
            .await
            .unwrap();
        assert_eq!(result.suspicious_sectors[0].sector, 10);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let mut result = ScanResult::new(8);
        result.record(HiddenSectorFinding {
            sector: 32,
            byte_offset: 32 * 512,
            classification: Classification::ContainsData,
            confidence: Confidence::Low,
            entropy: Some(3.2),
            matched_signature: None,
            label: "Unknown Data".into(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalSectors"], 8);
        assert_eq!(json["suspiciousSectors"][0]["byteOffset"], 16384);
        assert_eq!(json["suspiciousSectors"][0]["classification"], "CONTAINS_DATA");
        assert_eq!(json["suspiciousSectors"][0]["confidence"], "LOW");
    }
}
