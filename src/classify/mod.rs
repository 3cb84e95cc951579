//! Byte classification - stateless signature matching and entropy over windows.
//!
//! All functions here are pure: they look at a byte window and return a
//! verdict. Signature matching is exact and first-match-wins in catalog
//! order (see [`signatures`]).

pub mod signatures;

use serde::{Deserialize, Serialize};

pub use signatures::{
    format_magic, ByteSignature, SignatureCategory, SignatureIndex, FILESYSTEM_SIGNATURES,
    FILE_TYPE_SIGNATURES,
};

/// Entropy above which a window is treated as encrypted or compressed (bits/byte)
pub const ENCRYPTED_ENTROPY_THRESHOLD: f64 = 7.5;

/// Maximum Shannon entropy of a byte stream (log2 256)
pub const MAX_ENTROPY: f64 = 8.0;

/// Confidence attached to a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A filesystem signature hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemMatch {
    pub label: &'static str,
    pub confidence: Confidence,
}

/// Identify a volume boot record in `window`.
///
/// Every filesystem signature is tried in catalog order; entries whose
/// pattern does not fit in the window are skipped. Pattern matches are exact,
/// so any hit is reported with [`Confidence::High`].
pub fn classify_filesystem(window: &[u8]) -> Option<FilesystemMatch> {
    FILESYSTEM_SIGNATURES
        .iter()
        .find(|sig| sig.matches_at(window, 0))
        .map(|sig| FilesystemMatch {
            label: sig.label,
            confidence: Confidence::High,
        })
}

/// Identify the file type whose magic bytes open `window`
pub fn classify_file_type(window: &[u8]) -> Option<&'static ByteSignature> {
    FILE_TYPE_SIGNATURES.iter().find(|sig| sig.matches_at(window, 0))
}

/// Shannon entropy in bits per byte, in `[0, 8]`. An empty window is 0.
pub fn entropy(window: &[u8]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }

    let mut counts = [0u64; 256];
    for &byte in window {
        counts[byte as usize] += 1;
    }

    let len = window.len() as f64;
    let h = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / len;
            -p * p.log2()
        })
        .sum::<f64>();

    // A single symbol sums to -0.0; rounding can land a hair above 8
    if h <= 0.0 {
        0.0
    } else {
        h.min(MAX_ENTROPY)
    }
}

/// True iff every byte is 0x00 (an empty window counts as all-zero)
pub fn is_all_zero(window: &[u8]) -> bool {
    window.iter().all(|&b| b == 0)
}

/// Coarse entropy bands for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntropyClass {
    /// < 1.0 - constant or sparse data
    Constant,
    /// 1.0 - 4.0 - structured binary
    Structured,
    /// 4.0 - 6.0 - text, code
    Text,
    /// 6.0 - 7.5 - compressed media or packed data
    Compressed,
    /// above 7.5 - encrypted or random
    Encrypted,
}

impl EntropyClass {
    pub fn from_entropy(entropy: f64) -> Self {
        if entropy < 1.0 {
            EntropyClass::Constant
        } else if entropy < 4.0 {
            EntropyClass::Structured
        } else if entropy < 6.0 {
            EntropyClass::Text
        } else if entropy <= ENCRYPTED_ENTROPY_THRESHOLD {
            EntropyClass::Compressed
        } else {
            EntropyClass::Encrypted
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EntropyClass::Constant => "Constant/sparse data",
            EntropyClass::Structured => "Structured binary data",
            EntropyClass::Text => "Text or code-like data",
            EntropyClass::Compressed => "Compressed data",
            EntropyClass::Encrypted => "Encrypted or random data",
        }
    }
}

/// Everything the classifier can say about one window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowReport {
    pub offset: u64,
    pub length: usize,
    pub all_zero: bool,
    pub entropy: f64,
    pub entropy_class: EntropyClass,
    pub filesystem: Option<FilesystemMatch>,
    pub file_type: Option<&'static str>,
    pub mime_type: Option<&'static str>,
    pub magic_bytes: Option<String>,
}

impl WindowReport {
    pub fn analyze(offset: u64, window: &[u8]) -> Self {
        let h = entropy(window);
        let file_type = classify_file_type(window);
        Self {
            offset,
            length: window.len(),
            all_zero: is_all_zero(window),
            entropy: h,
            entropy_class: EntropyClass::from_entropy(h),
            filesystem: classify_filesystem(window),
            file_type: file_type.map(|s| s.label),
            mime_type: file_type.map(|s| s.mime_type),
            magic_bytes: file_type.map(|s| s.magic_hex()),
        }
    }
}
