//! Extension spoofing detection.
//!
//! Compares the extension a file claims with the type its magic bytes
//! identify. The verdict is a pure function of its two inputs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::{self, ByteSignature};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpoofingVerdict {
    pub is_spoofed: bool,
    /// Lower-case, without a leading dot
    pub claimed_extension: String,
    pub actual_type_label: String,
    pub risk_level: RiskLevel,
    pub indicators: Vec<String>,
    pub recommendation: String,
}

pub const RECOMMEND_UNKNOWN: &str = "File type could not be determined from magic bytes";
pub const RECOMMEND_MATCH: &str = "File extension matches actual file type";
pub const RECOMMEND_QUARANTINE: &str = "QUARANTINE - Do not open, likely malicious";
pub const RECOMMEND_INSPECT: &str = "CAUTION - Inspect archive contents before opening";
pub const RECOMMEND_REVIEW: &str = "REVIEW - File type mismatch detected";

/// `".PDF "` -> `"pdf"`
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpoofingDetector;

impl SpoofingDetector {
    pub fn new() -> Self {
        Self
    }

    /// Judge `claimed_extension` against the type identified from `window`
    pub fn detect(&self, claimed_extension: &str, window: &[u8]) -> SpoofingVerdict {
        self.judge(claimed_extension, classify::classify_file_type(window))
    }

    /// Judge against an already-classified signature
    pub fn judge(&self, claimed_extension: &str, actual: Option<&ByteSignature>) -> SpoofingVerdict {
        let claimed = normalize_extension(claimed_extension);

        let Some(sig) = actual else {
            return SpoofingVerdict {
                is_spoofed: false,
                claimed_extension: claimed,
                actual_type_label: "Unknown".to_string(),
                risk_level: RiskLevel::Low,
                indicators: Vec::new(),
                recommendation: RECOMMEND_UNKNOWN.to_string(),
            };
        };

        let known = sig.known_extensions;
        if known.is_empty() || known.iter().any(|e| e.eq_ignore_ascii_case(&claimed)) {
            return SpoofingVerdict {
                is_spoofed: false,
                claimed_extension: claimed,
                actual_type_label: sig.label.to_string(),
                risk_level: RiskLevel::Low,
                indicators: Vec::new(),
                recommendation: RECOMMEND_MATCH.to_string(),
            };
        }

        let label = sig.label;
        let (risk_level, indicators, recommendation) = if is_executable_label(label) {
            (
                RiskLevel::Critical,
                vec![
                    format!("Executable file disguised with {} extension", claimed),
                    "File may be malware disguised as document".to_string(),
                    "Common social engineering attack pattern".to_string(),
                ],
                RECOMMEND_QUARANTINE,
            )
        } else if label.contains("Archive") {
            (
                RiskLevel::High,
                vec![
                    format!("Archive file disguised with {} extension", claimed),
                    "May contain hidden malicious files".to_string(),
                ],
                RECOMMEND_INSPECT,
            )
        } else {
            (
                RiskLevel::Medium,
                vec![format!(
                    "Extension {} does not match actual type: {}",
                    claimed, label
                )],
                RECOMMEND_REVIEW,
            )
        };

        tracing::debug!(
            claimed = %claimed,
            actual = label,
            risk = %risk_level,
            "Extension spoofing detected"
        );

        SpoofingVerdict {
            is_spoofed: true,
            claimed_extension: claimed,
            actual_type_label: label.to_string(),
            risk_level,
            indicators,
            recommendation: recommendation.to_string(),
        }
    }
}

fn is_executable_label(label: &str) -> bool {
    ["Executable", "ELF", "Mach-O"].iter().any(|k| label.contains(k))
}

/// [`SpoofingDetector::detect`] without constructing a detector
pub fn detect(claimed_extension: &str, window: &[u8]) -> SpoofingVerdict {
    SpoofingDetector.detect(claimed_extension, window)
}
