//! Error types shared by the forensic engine.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ForensicError>;

#[derive(Debug, Error)]
pub enum ForensicError {
    /// The source is shorter than a required read window
    #[error("source too small: needed {needed} bytes, only {available} available")]
    TooSmall { needed: u64, available: u64 },

    /// The underlying byte source failed to read
    #[error("I/O failure at offset {offset:#x}: {source}")]
    IoFailure {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// Unrecognized scan mode string
    #[error("invalid scan mode '{0}' (expected quick, standard or paranoid)")]
    InvalidModeParameter(String),

    /// A cancellation flag was raised while the operation was running
    #[error("operation cancelled")]
    Cancelled,
}

impl ForensicError {
    pub(crate) fn io(offset: u64, source: std::io::Error) -> Self {
        ForensicError::IoFailure { offset, source }
    }

    /// True when the error came from the byte source rather than the caller
    pub fn is_io(&self) -> bool {
        matches!(self, ForensicError::IoFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = ForensicError::TooSmall {
            needed: 512,
            available: 100,
        };
        assert_eq!(
            err.to_string(),
            "source too small: needed 512 bytes, only 100 available"
        );

        let err = ForensicError::InvalidModeParameter("turbo".into());
        assert!(err.to_string().contains("turbo"));
    }

    #[test]
    fn test_io_failure_keeps_source() {
        use std::error::Error;

        let err = ForensicError::io(
            0x200,
            std::io::Error::new(std::io::ErrorKind::Other, "device gone"),
        );
        assert!(err.is_io());
        assert!(err.to_string().contains("0x200"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("device gone"));
    }
}
