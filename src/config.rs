//! Configuration - examiner preferences from `config.toml`
//!
//! Every section falls back to built-in defaults, so a partial file (or none
//! at all) is valid. Defaults reproduce the engine's reference thresholds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::carve::CarveOptions;
use crate::scan::ScanOptions;
use crate::triage::TriageOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    /// Sector scanner tuning
    pub scan: ScanOptions,
    /// File carver tuning
    pub carve: CarveOptions,
    /// Directory triage
    pub triage: TriageOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Warn when an evidence image is opened from a writable file
    pub warn_if_writable: bool,
    /// Memory-map images instead of positional reads
    pub use_mmap: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            warn_if_writable: true,
            use_mmap: false,
        }
    }
}

impl Config {
    /// Load config from the default path, or defaults when absent/unreadable
    pub fn load() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable config");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("org", "sector-hound", "sector-hound")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".sector-hound")
                    .join("config.toml")
            })
    }

    /// Write the commented sample config if no file exists; returns its path
    pub fn ensure_exists(path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, generate_sample_config())
                .with_context(|| format!("Failed to write config: {}", path.display()))?;
            tracing::info!("Created default config at {}", path.display());
        }
        Ok(path.to_path_buf())
    }
}

/// Generate a sample config file with comments
pub fn generate_sample_config() -> String {
    r#"# sector-hound configuration
# Location: ~/.config/sector-hound/config.toml (or %APPDATA%\sector-hound\config\config.toml on Windows)

[general]
# Log level: trace, debug, info, warn, error
log_level = "info"

# Warn when the evidence image file is writable
warn_if_writable = true

# Memory-map images instead of positional reads
use_mmap = false

[scan]
# Mode used when --mode is not given: quick, standard, paranoid
default_mode = "standard"

# Sectors probed for hidden partitions in every mode
hiding_spots = [32, 64, 128, 256, 2048]

# Sectors read at each hiding spot
probe_window_sectors = 16

sector_size = 512

# Bytes read per sampled sector during the sweep
sweep_window_bytes = 1024

# Standard mode: every Nth sector, up to this many sectors
standard_stride = 64
standard_sector_cap = 100000

# Paranoid mode: every Nth sector of the whole image
paranoid_stride = 1

# Bits per byte above which data is treated as encrypted/compressed
entropy_threshold = 7.5

# Sweep sectors between progress updates
progress_interval = 1000

[carve]
# Bytes at the start of the image examined for file headers
window_bytes = 1048576

max_candidates = 100

# Search distance for the next header when estimating size
lookahead_bytes = 10485760

# Estimated size when no following header is found
default_size = 1048576

# Bytes skipped past a matched header; scanning resumes one byte after them
skip_padding = 100

[triage]
# Worker threads (0 = one per CPU)
workers = 0

# Leading bytes examined for type, entropy and strings
header_bytes = 1048576

min_string_len = 4

skip_hidden = true
recursive = true
"#
    .to_string()
}
