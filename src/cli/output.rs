//! Report rendering - JSON envelope and colored human output

use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use crate::carve::AssessedCandidate;
use crate::classify::{Confidence, WindowReport};
use crate::partition::{PartitionEntry, PartitionStatus};
use crate::scan::{HiddenSectorFinding, ScanResult};
use crate::spoof::{RiskLevel, SpoofingVerdict};
use crate::triage::TriageSummary;

/// Run metadata wrapped around every JSON result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<'a, T: Serialize> {
    pub tool: &'static str,
    pub version: &'static str,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// `user@host`
    pub operator: String,
    pub source: Option<&'a Path>,
    pub result: &'a T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn new(source: Option<&'a Path>, result: &'a T) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            operator: operator(),
            source,
            result,
        }
    }
}

pub fn operator() -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{}@{}", whoami::username(), hostname)
}

pub fn print_json<T: Serialize>(source: Option<&Path>, result: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&Envelope::new(source, result))?);
    Ok(())
}

fn size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

fn header(title: &str) {
    println!("\n{}", "═".repeat(60).bright_cyan());
    println!("  {}", title.bold());
    println!("{}", "═".repeat(60).bright_cyan());
}

fn confidence_tag(c: Confidence) -> colored::ColoredString {
    match c {
        Confidence::High => "HIGH".red().bold(),
        Confidence::Medium => "MEDIUM".yellow(),
        Confidence::Low => "LOW".dimmed(),
    }
}

fn risk_tag(r: RiskLevel) -> colored::ColoredString {
    match r {
        RiskLevel::Critical => "CRITICAL".on_red().white().bold(),
        RiskLevel::High => "HIGH".red().bold(),
        RiskLevel::Medium => "MEDIUM".yellow(),
        RiskLevel::Low => "LOW".green(),
    }
}

pub fn print_partitions(partitions: &[PartitionEntry]) {
    if partitions.is_empty() {
        println!("  {}", "No MBR partition table".dimmed());
        return;
    }
    println!(
        "  {:<3} {:<24} {:<10} {:>12} {:>12} {:>10}",
        "#", "Type", "Status", "Start", "Sectors", "Size"
    );
    for p in partitions {
        let status = match p.status {
            PartitionStatus::Active => "ACTIVE".green(),
            PartitionStatus::Hidden => "HIDDEN".red().bold(),
            PartitionStatus::Inactive => "INACTIVE".normal(),
        };
        println!(
            "  {:<3} {:<24} {:<10} {:>12} {:>12} {:>10}",
            p.index,
            format!("{} (0x{:02X})", p.filesystem_guess, p.type_code),
            status,
            p.start_sector,
            p.size_sectors,
            size(p.size_bytes())
        );
    }
}

fn print_findings(title: &str, findings: &[HiddenSectorFinding]) {
    if findings.is_empty() {
        return;
    }
    println!("\n  {} ({})", title.bold(), findings.len());
    for f in findings {
        let entropy = f
            .entropy
            .map(|h| format!("  entropy {:.2}", h))
            .unwrap_or_default();
        println!(
            "    sector {:>10}  offset 0x{:010X}  {:<22} {}{}",
            f.sector,
            f.byte_offset,
            f.label,
            confidence_tag(f.confidence),
            entropy.dimmed()
        );
    }
}

pub fn print_scan(image: &Path, result: &ScanResult) {
    header(&format!("Sector scan: {}", image.display()));
    println!(
        "  Sectors: {}  ({})",
        result.total_sectors,
        size(result.total_sectors * crate::partition::SECTOR_SIZE as u64)
    );

    println!();
    print_partitions(&result.partitions);

    print_findings("Hidden partitions", &result.hidden_partitions);
    print_findings("Filesystem signatures", &result.filesystem_signatures);
    print_findings("Encrypted / compressed regions", &result.encrypted_regions);
    print_findings("Suspicious sectors", &result.suspicious_sectors);

    let total = result.total_findings();
    println!();
    if total == 0 {
        println!("  {} No findings", "✓".bright_green());
    } else {
        println!("  {} {} findings", "⚠".yellow().bold(), total);
    }
}

pub fn print_carve(image: &Path, candidates: &[AssessedCandidate]) {
    header(&format!("File carve: {}", image.display()));
    if candidates.is_empty() {
        println!("  {}", "No file signatures found".dimmed());
        return;
    }
    for a in candidates {
        let c = &a.candidate;
        let verified = if a.verified {
            "✓".bright_green()
        } else {
            " ".normal()
        };
        let deleted = if c.likely_deleted {
            "likely deleted".yellow()
        } else {
            "".normal()
        };
        println!(
            "  {:>3}. 0x{:08X}  {:>10}  {:<26} .{:<5} {} {}",
            c.sequence_index,
            c.byte_offset,
            size(c.estimated_size),
            c.signature_label,
            c.extension_guess,
            verified,
            deleted
        );
    }
    println!("\n  {} candidates", candidates.len());
}

pub fn print_verdict(path: &Path, verdict: &SpoofingVerdict) {
    header(&format!("Spoofing check: {}", path.display()));
    println!("  Claimed extension: .{}", verdict.claimed_extension);
    println!("  Actual type:       {}", verdict.actual_type_label);
    println!("  Risk:              {}", risk_tag(verdict.risk_level));
    for indicator in &verdict.indicators {
        println!("    {} {}", "•".yellow(), indicator);
    }
    println!("  {}", verdict.recommendation.bold());
}

pub fn print_window(report: &WindowReport) {
    header(&format!(
        "Window 0x{:X} (+{} bytes)",
        report.offset, report.length
    ));
    if report.all_zero {
        println!("  {}", "All zero".dimmed());
    }
    println!(
        "  Entropy:    {:.3} bits/byte  ({})",
        report.entropy,
        report.entropy_class.description()
    );
    match &report.filesystem {
        Some(fs) => println!("  Filesystem: {} [{}]", fs.label.bold(), confidence_tag(fs.confidence)),
        None => println!("  Filesystem: {}", "none".dimmed()),
    }
    match (report.file_type, &report.magic_bytes) {
        (Some(label), Some(magic)) => println!("  File type:  {} ({})", label.bold(), magic),
        _ => println!("  File type:  {}", "unknown".dimmed()),
    }
}

pub fn print_triage(summary: &TriageSummary) {
    header("File triage");
    for f in &summary.files {
        let mark = if f.spoofing.is_spoofed {
            format!("{}", risk_tag(f.spoofing.risk_level))
        } else {
            format!("{}", "ok".green())
        };
        println!(
            "  {:<10} {:<40} {:>10}  {}",
            mark,
            f.path.display(),
            size(f.size),
            f.actual_type.as_deref().unwrap_or("unknown")
        );
        if !f.strings.urls.is_empty() || !f.strings.ip_addresses.is_empty() {
            println!(
                "             {} {} URLs, {} IPs, {} e-mails",
                "↳".dimmed(),
                f.strings.urls.len(),
                f.strings.ip_addresses.len(),
                f.strings.emails.len()
            );
        }
    }
    for failure in &summary.failures {
        println!(
            "  {:<10} {}  {}",
            "FAILED".red(),
            failure.path.display(),
            failure.error.dimmed()
        );
    }
    println!(
        "\n  {} files, {} spoofed, {} failed, {} in {} ms",
        summary.files.len(),
        summary.spoofed,
        summary.failures.len(),
        size(summary.bytes_total),
        summary.duration_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let result = vec![1, 2, 3];
        let env = Envelope::new(Some(Path::new("/evidence/disk.dd")), &result);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["tool"], "sector-hound");
        assert_eq!(json["source"], "/evidence/disk.dd");
        assert_eq!(json["result"], serde_json::json!([1, 2, 3]));
        assert!(json["runId"].as_str().unwrap().len() == 36);
        assert!(json["operator"].as_str().unwrap().contains('@'));
    }
}
