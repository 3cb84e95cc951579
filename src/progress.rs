//! Progress reporting and cancellation for long-running scans.
//!
//! A [`ProgressSink`] is invoked synchronously at the scanner's checkpoints.
//! Sinks cannot fail the scan; a slow sink simply slows it down. Findings are
//! pushed to the sink as they are produced, so a caller still has everything
//! found so far when a later read fails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::scan::HiddenSectorFinding;

/// Receiver of progress updates and incremental findings
pub trait ProgressSink: Send + Sync {
    /// `percent` is in `[0, 100]` and never decreases within one operation
    fn progress(&self, percent: f64, message: &str);

    fn on_finding(&self, _finding: &HiddenSectorFinding) {}
}

impl<F> ProgressSink for F
where
    F: Fn(f64, &str) + Send + Sync,
{
    fn progress(&self, percent: f64, message: &str) {
        self(percent, message)
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn progress(&self, _percent: f64, _message: &str) {}
}

/// Forwards progress and findings to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn progress(&self, percent: f64, message: &str) {
        tracing::debug!(percent = format!("{:.1}", percent), "{}", message);
    }

    fn on_finding(&self, finding: &HiddenSectorFinding) {
        tracing::info!(
            sector = finding.sector,
            classification = ?finding.classification,
            label = %finding.label,
            entropy = ?finding.entropy,
            "Finding"
        );
    }
}

/// Event published by [`ChannelSink`]
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Progress { percent: f64, message: String },
    Finding(HiddenSectorFinding),
}

/// Publishes events on a crossbeam channel. A disconnected receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn progress(&self, percent: f64, message: &str) {
        let _ = self.tx.send(ProgressEvent::Progress {
            percent,
            message: message.to_string(),
        });
    }

    fn on_finding(&self, finding: &HiddenSectorFinding) {
        let _ = self.tx.send(ProgressEvent::Finding(finding.clone()));
    }
}

/// Keeps every update in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<(f64, String)>>,
    findings: Mutex<Vec<HiddenSectorFinding>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<(f64, String)> {
        self.updates.lock().clone()
    }

    pub fn percents(&self) -> Vec<f64> {
        self.updates.lock().iter().map(|(p, _)| *p).collect()
    }

    pub fn findings(&self) -> Vec<HiddenSectorFinding> {
        self.findings.lock().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn progress(&self, percent: f64, message: &str) {
        self.updates.lock().push((percent, message.to_string()));
    }

    fn on_finding(&self, finding: &HiddenSectorFinding) {
        self.findings.lock().push(finding.clone());
    }
}

/// Shared cancellation flag checked at every yield point
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
