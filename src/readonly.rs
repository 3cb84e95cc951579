//! Read-only evidence access
//!
//! Evidence images are only ever opened for reading. Hosts can additionally
//! warn the examiner when the image file itself is writable, since an
//! accidental write from another tool would alter the evidence.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;

/// Open an evidence file in read-only mode
pub fn open_readonly(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).write(false).open(path)
}

/// Check whether the current user could open `path` for writing
pub fn is_writable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.permissions().readonly() => false,
        Ok(meta) if meta.is_file() => OpenOptions::new()
            .write(true)
            .create(false)
            .open(path)
            .is_ok(),
        _ => false,
    }
}

/// Warn on stderr if the evidence file is writable. Stdout stays reserved for
/// reports.
pub fn warn_if_writable(path: &Path) {
    let _ = write_writable_warning(path, &mut io::stderr().lock());
}

/// Write the writability banner for `path` to `out`; returns whether it was
/// written
pub fn write_writable_warning<W: Write>(path: &Path, out: &mut W) -> io::Result<bool> {
    if !is_writable(path) {
        return Ok(false);
    }

    tracing::warn!(path = %path.display(), "Evidence image is writable");
    writeln!(
        out,
        "\n  {} {}",
        "⚠".yellow().bold(),
        "WARNING: Evidence image is writable!".yellow().bold()
    )?;
    writeln!(
        out,
        "  {}\n",
        "Consider `chmod a-w` or a write blocker before analysis.".dimmed()
    )?;
    Ok(true)
}
