//! Error types for the decoding layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! for decoder-internal failures; decoders turn these into warnings.

use thiserror::Error;

/// Error type for decoder operations.
///
/// Decoders use these internally to skip the element that failed and
/// record a `DecodeWarning` in its place.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error decoding structure or syntax.
    #[error("font parse error: {0}")]
    Parse(String),

    /// A read ran past the end of the data.
    #[error("truncated data at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Offset the read started at.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Bytes left at that offset.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_parse() {
        let err = BackendError::Parse("bad chunk size".to_string());
        assert_eq!(err.to_string(), "font parse error: bad chunk size");
    }

    #[test]
    fn backend_error_truncated_display() {
        let err = BackendError::Truncated {
            offset: 12,
            needed: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "truncated data at offset 12: needed 4 bytes, 1 available"
        );
    }

    #[test]
    fn backend_error_implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(BackendError::Parse("test".to_string()));
        assert!(err.to_string().contains("test"));
    }
}
