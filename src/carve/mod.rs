//! File carving - heuristic file boundaries from magic numbers in a raw prefix.
//!
//! Carving here is triage, not recovery: only a bounded prefix of the image
//! (1 MiB by default) is examined, and each candidate's size is estimated as
//! the distance to the next recognizable header. Results are investigation
//! leads, never forensically complete files.
//!
//! # Design
//!
//! - **Signature dispatch**: first-byte index over the file-type catalog,
//!   catalog order decides between overlapping patterns
//! - **Resumable pass**: [`CarvePass`] advances in byte budgets so async hosts
//!   can yield and report progress between slices
//! - **Next-header sizing**: distance to the next catalog hit within the
//!   lookahead, else a fixed default clamped to the remaining bytes

use std::sync::OnceLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::classify::{self, ByteSignature, EntropyClass, SignatureIndex, FILE_TYPE_SIGNATURES};
use crate::error::{ForensicError, Result};
use crate::progress::{CancelFlag, ProgressSink};
use crate::source::ByteSource;

/// Bytes of the image examined by default
pub const DEFAULT_WINDOW_BYTES: usize = 1024 * 1024;

pub const DEFAULT_MAX_CANDIDATES: usize = 100;

/// How far past a header to look for the next one
pub const DEFAULT_LOOKAHEAD_BYTES: usize = 10 * 1024 * 1024;

/// Size assumed when no following header is found
pub const DEFAULT_ESTIMATED_SIZE: u64 = 1024 * 1024;

/// Bytes skipped past a matched pattern; scanning resumes one byte after them
pub const DEFAULT_SKIP_PADDING: usize = 100;

/// Offsets examined between progress checkpoints in [`FileCarver::carve_source`]
const SLICE_BUDGET: usize = 64 * 1024;

/// Bytes of each candidate fed to the assessment step
const ASSESS_SAMPLE_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarveOptions {
    pub window_bytes: usize,
    pub max_candidates: usize,
    pub lookahead_bytes: usize,
    pub default_size: u64,
    pub skip_padding: usize,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            window_bytes: DEFAULT_WINDOW_BYTES,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            lookahead_bytes: DEFAULT_LOOKAHEAD_BYTES,
            default_size: DEFAULT_ESTIMATED_SIZE,
            skip_padding: DEFAULT_SKIP_PADDING,
        }
    }
}

/// A possible file start found in the carved window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarvedFileCandidate {
    /// 1-based, in discovery order
    pub sequence_index: u32,
    pub byte_offset: u64,
    pub estimated_size: u64,
    pub signature_label: String,
    pub extension_guess: String,
    pub mime_type: String,
    pub likely_deleted: bool,
}

/// Positional "likely deleted" heuristic: the candidate starts in the second
/// half of the scanned window.
///
/// There is no allocation-table evidence behind this. It is kept for report
/// compatibility and must not drive any other decision.
pub fn likely_deleted(offset: u64, window_len: u64) -> bool {
    window_len > 0 && offset.saturating_mul(2) >= window_len
}

/// Estimated size of a file starting at `offset` with a header `header_len`
/// bytes long: distance to the next catalog hit within `lookahead` bytes,
/// else `min(default_size, remaining)`.
pub fn estimate_size(
    buffer: &[u8],
    offset: usize,
    header_len: usize,
    index: &SignatureIndex,
    options: &CarveOptions,
) -> u64 {
    let remaining = buffer.len().saturating_sub(offset);
    let limit = offset.saturating_add(options.lookahead_bytes.min(remaining));

    (offset + header_len.max(1)..limit)
        .find(|&i| index.match_at(buffer, i).is_some())
        .map(|next| (next - offset) as u64)
        .unwrap_or_else(|| options.default_size.min(remaining as u64))
}

fn file_type_index() -> &'static SignatureIndex {
    static INDEX: OnceLock<SignatureIndex> = OnceLock::new();
    INDEX.get_or_init(|| SignatureIndex::new(FILE_TYPE_SIGNATURES))
}

/// Carve `buffer` with default options and at most `max_candidates` results
pub fn carve(buffer: &[u8], max_candidates: usize) -> Vec<CarvedFileCandidate> {
    let options = CarveOptions {
        max_candidates,
        ..Default::default()
    };
    let mut pass = CarvePass::new(buffer, file_type_index(), &options);
    while !pass.advance(usize::MAX) {}
    pass.into_candidates()
}

/// One in-progress carve over a buffer
pub struct CarvePass<'a> {
    buffer: &'a [u8],
    index: &'a SignatureIndex,
    options: &'a CarveOptions,
    pos: usize,
    candidates: Vec<CarvedFileCandidate>,
}

impl<'a> CarvePass<'a> {
    pub fn new(buffer: &'a [u8], index: &'a SignatureIndex, options: &'a CarveOptions) -> Self {
        Self {
            buffer,
            index,
            options,
            pos: 0,
            candidates: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.buffer.len() || self.candidates.len() >= self.options.max_candidates
    }

    /// Examine up to `budget` start offsets; returns true once the pass is done
    pub fn advance(&mut self, budget: usize) -> bool {
        let mut examined = 0usize;

        while !self.is_done() && examined < budget {
            examined += 1;

            match self.index.match_at(self.buffer, self.pos) {
                Some(sig) => {
                    self.push_candidate(sig);
                    self.pos = self
                        .pos
                        .saturating_add(sig.pattern.len() + self.options.skip_padding + 1);
                }
                None => self.pos += 1,
            }
        }

        self.is_done()
    }

    fn push_candidate(&mut self, sig: &'static ByteSignature) {
        let offset = self.pos;
        let estimated_size = estimate_size(
            self.buffer,
            offset,
            sig.required_len(),
            self.index,
            self.options,
        );
        let candidate = CarvedFileCandidate {
            sequence_index: self.candidates.len() as u32 + 1,
            byte_offset: offset as u64,
            estimated_size,
            signature_label: sig.label.to_string(),
            extension_guess: sig.primary_extension().to_string(),
            mime_type: sig.mime_type.to_string(),
            likely_deleted: likely_deleted(offset as u64, self.buffer.len() as u64),
        };

        tracing::debug!(
            offset,
            estimated_size,
            signature = sig.label,
            "Carve candidate"
        );
        self.candidates.push(candidate);
    }

    /// Fraction of the buffer examined, 0.0..=1.0
    pub fn fraction_done(&self) -> f64 {
        if self.is_done() || self.buffer.is_empty() {
            1.0
        } else {
            self.pos as f64 / self.buffer.len() as f64
        }
    }

    pub fn candidates(&self) -> &[CarvedFileCandidate] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<CarvedFileCandidate> {
        self.candidates
    }
}

/// A candidate with corroborating evidence from its own bytes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessedCandidate {
    #[serde(flatten)]
    pub candidate: CarvedFileCandidate,
    /// BLAKE3 of the estimated extent within the carved window
    pub blake3: String,
    /// Entropy of the candidate's leading bytes
    pub entropy: f64,
    pub entropy_class: EntropyClass,
    /// MIME type reported by `infer`, if it recognises the bytes
    pub infer_mime: Option<String>,
    /// `infer` agrees with the signature match
    pub verified: bool,
}

/// Carver over a [`ByteSource`] prefix with cancellation support
pub struct FileCarver {
    options: CarveOptions,
    index: SignatureIndex,
    cancel: CancelFlag,
}

impl Default for FileCarver {
    fn default() -> Self {
        Self::new(CarveOptions::default())
    }
}

impl FileCarver {
    pub fn new(options: CarveOptions) -> Self {
        Self {
            options,
            index: SignatureIndex::new(FILE_TYPE_SIGNATURES),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn options(&self) -> &CarveOptions {
        &self.options
    }

    /// Carve an in-memory buffer in one go
    pub fn carve_buffer(&self, buffer: &[u8]) -> Vec<CarvedFileCandidate> {
        let mut pass = CarvePass::new(buffer, &self.index, &self.options);
        while !pass.advance(usize::MAX) {}
        pass.into_candidates()
    }

    /// Read the configured prefix of `image` and carve it, yielding between
    /// slices. Returns the candidates together with the carved window.
    pub async fn carve_source(
        &self,
        image: &dyn ByteSource,
        sink: &dyn ProgressSink,
    ) -> Result<(Vec<CarvedFileCandidate>, Vec<u8>)> {
        let start = Instant::now();

        sink.progress(0.0, "Reading image header region...");
        let window = image.read_range(0, self.options.window_bytes)?;

        tracing::info!(
            image_size = image.len(),
            window = window.len(),
            max_candidates = self.options.max_candidates,
            "Starting file carve"
        );

        let mut pass = CarvePass::new(&window, &self.index, &self.options);
        let mut last = 0.0f64;
        loop {
            let done = pass.advance(SLICE_BUDGET);

            let percent = (pass.fraction_done() * 100.0).max(last);
            last = percent;
            if done {
                break;
            }
            sink.progress(
                percent,
                &format!("Carving: {} candidates so far", pass.candidates().len()),
            );

            tokio::task::yield_now().await;
            if self.cancel.is_cancelled() {
                tracing::info!("File carve cancelled");
                return Err(ForensicError::Cancelled);
            }
        }

        let candidates = pass.into_candidates();
        sink.progress(100.0, &format!("Found {} candidates", candidates.len()));

        tracing::info!(
            candidates = candidates.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "File carve complete"
        );

        Ok((candidates, window))
    }

    /// Hash, entropy and `infer` second opinion for each candidate.
    /// `window` is the buffer the candidates were carved from.
    pub fn assess(&self, candidates: &[CarvedFileCandidate], window: &[u8]) -> Vec<AssessedCandidate> {
        candidates
            .iter()
            .map(|c| assess_candidate(c, window))
            .collect()
    }
}

fn assess_candidate(candidate: &CarvedFileCandidate, window: &[u8]) -> AssessedCandidate {
    let start = (candidate.byte_offset as usize).min(window.len());
    let end = start
        .saturating_add(candidate.estimated_size as usize)
        .min(window.len());
    let extent = &window[start..end];
    let sample = &extent[..extent.len().min(ASSESS_SAMPLE_BYTES)];

    let entropy = classify::entropy(sample);
    let kind = infer::get(sample);
    let verified = kind.map_or(false, |k| {
        k.mime_type() == candidate.mime_type || k.extension() == candidate.extension_guess
    });

    AssessedCandidate {
        candidate: candidate.clone(),
        blake3: blake3::hash(extent).to_hex().to_string(),
        entropy,
        entropy_class: EntropyClass::from_entropy(entropy),
        infer_mime: kind.map(|k| k.mime_type().to_string()),
        verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NoProgress, RecordingSink};
    use crate::source::MemorySource;
    use proptest::prelude::*;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const PDF_HEADER: &[u8] = b"%PDF-1.7\n";

    fn buffer_with(len: usize, placements: &[(usize, &[u8])]) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        for &(off, bytes) in placements {
            buf[off..off + bytes.len()].copy_from_slice(bytes);
        }
        buf
    }

    #[test]
    fn test_likely_deleted_heuristic() {
        assert!(!likely_deleted(0, 1000));
        assert!(!likely_deleted(499, 1000));
        assert!(likely_deleted(500, 1000));
        assert!(!likely_deleted(0, 0));
    }

    #[test]
    fn test_empty_and_unrecognised_buffers() {
        assert!(carve(&[], 100).is_empty());
        assert!(carve(&[0u8; 8192], 100).is_empty());
    }

    #[test]
    fn test_two_candidates_sized_by_next_header() {
        let buf = buffer_with(10_000, &[(1000, PDF_HEADER), (6000, PNG_HEADER)]);
        let found = carve(&buf, 100);

        assert_eq!(found.len(), 2);

        assert_eq!(found[0].sequence_index, 1);
        assert_eq!(found[0].byte_offset, 1000);
        assert_eq!(found[0].signature_label, "PDF Document");
        assert_eq!(found[0].extension_guess, "pdf");
        assert_eq!(found[0].estimated_size, 5000);
        assert!(!found[0].likely_deleted);

        assert_eq!(found[1].sequence_index, 2);
        assert_eq!(found[1].byte_offset, 6000);
        assert_eq!(found[1].signature_label, "PNG Image");
        // No further header: remaining bytes
        assert_eq!(found[1].estimated_size, 4000);
        assert!(found[1].likely_deleted);
    }

    #[test]
    fn test_skip_ahead_after_match() {
        // A second MZ inside the skip distance is not re-detected
        let buf = buffer_with(4096, &[(0, b"MZ"), (50, b"MZ"), (200, b"MZ")]);
        let found = carve(&buf, 100);
        let offsets: Vec<u64> = found.iter().map(|c| c.byte_offset).collect();
        assert_eq!(offsets, vec![0, 200]);
        // Size still measured to the nearest following header
        assert_eq!(found[0].estimated_size, 50);
    }

    #[test]
    fn test_skip_boundary() {
        // After MZ at 0 the next offset examined is 2 + 100 + 1
        let at = |second: usize| -> Vec<u64> {
            let buf = buffer_with(4096, &[(0, b"MZ"), (second, b"MZ")]);
            carve(&buf, 100).iter().map(|c| c.byte_offset).collect()
        };
        assert_eq!(at(102), vec![0]);
        assert_eq!(at(103), vec![0, 103]);
    }

    #[test]
    fn test_max_candidates_respected() {
        let mut buf = vec![0u8; 64 * 1024];
        for off in (0..buf.len() - 2).step_by(256) {
            buf[off] = 0x4D;
            buf[off + 1] = 0x5A;
        }
        assert_eq!(carve(&buf, 10).len(), 10);
        assert_eq!(carve(&buf, 100).len(), 100);
        assert!(carve(&buf, 0).is_empty());
    }

    #[test]
    fn test_resumable_pass_matches_one_shot() {
        let buf = buffer_with(
            50_000,
            &[(100, PDF_HEADER), (20_000, PNG_HEADER), (40_000, b"SQLite format 3\0")],
        );
        let options = CarveOptions::default();
        let index = SignatureIndex::new(FILE_TYPE_SIGNATURES);

        let mut pass = CarvePass::new(&buf, &index, &options);
        let mut rounds = 0;
        while !pass.advance(1000) {
            rounds += 1;
            assert!(pass.fraction_done() < 1.0);
        }
        assert!(rounds > 10);
        assert_eq!(pass.into_candidates(), carve(&buf, 100));
    }

    #[tokio::test]
    async fn test_carve_source_reads_only_window() {
        let mut img = buffer_with(3 * 1024 * 1024, &[(4096, PDF_HEADER)]);
        // Past the 1 MiB window
        img[2 * 1024 * 1024..2 * 1024 * 1024 + PNG_HEADER.len()].copy_from_slice(PNG_HEADER);

        let sink = RecordingSink::new();
        let (found, window) = FileCarver::default()
            .carve_source(&MemorySource::new(img), &sink)
            .await
            .unwrap();

        assert_eq!(window.len(), DEFAULT_WINDOW_BYTES);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature_label, "PDF Document");
        assert_eq!(found[0].estimated_size, (DEFAULT_WINDOW_BYTES - 4096) as u64);

        let percents = sink.percents();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents.last().copied(), Some(100.0));
    }

    #[tokio::test]
    async fn test_carve_source_cancel() {
        let flag = CancelFlag::new();
        flag.cancel();
        let carver = FileCarver::default().with_cancel(flag);
        let err = carver
            .carve_source(&MemorySource::new(vec![0u8; 512 * 1024]), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ForensicError::Cancelled));
    }

    #[test]
    fn test_assess_verifies_with_infer() {
        let mut png = PNG_HEADER.to_vec();
        png.extend_from_slice(&[0, 0, 0, 13]);
        png.extend_from_slice(b"IHDR");
        png.resize(512, 0);
        let buf = buffer_with(2048, &[(0, &png)]);

        let carver = FileCarver::default();
        let found = carver.carve_buffer(&buf);
        let assessed = carver.assess(&found, &buf);

        assert_eq!(assessed.len(), 1);
        assert_eq!(assessed[0].infer_mime.as_deref(), Some("image/png"));
        assert!(assessed[0].verified);
        assert_eq!(assessed[0].blake3.len(), 64);
    }

    #[test]
    fn test_candidate_json_shape() {
        let buf = buffer_with(1024, &[(0, PDF_HEADER)]);
        let json = serde_json::to_value(carve(&buf, 1)).unwrap();
        assert_eq!(json[0]["sequenceIndex"], 1);
        assert_eq!(json[0]["signatureLabel"], "PDF Document");
        assert_eq!(json[0]["likelyDeleted"], false);
    }

    proptest! {
        #[test]
        fn prop_carve_never_exceeds_max(
            data in proptest::collection::vec(any::<u8>(), 0..16_384),
            max in 0usize..150,
        ) {
            let found = carve(&data, max);
            prop_assert!(found.len() <= max);
            for c in &found {
                prop_assert!(c.byte_offset < data.len() as u64);
                prop_assert!(c.byte_offset + c.estimated_size <= data.len() as u64);
            }
        }
    }
}
