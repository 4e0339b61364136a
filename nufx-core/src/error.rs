//! Error types for NuFX operations.
//!
//! Every failure the archive reader and its codec stack can report is one of
//! a handful of kinds: the input is not a NuFX archive at all, the input
//! ended early, a compressed stream is damaged, or a field names something
//! this reader cannot decode. CRC mismatches are deliberately absent; they
//! are reported as flags on the parsed structures instead.

use std::io;
use thiserror::Error;

/// The main error type for NuFX operations.
#[derive(Debug, Error)]
pub enum NufxError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// No usable archive signature was found.
    #[error("Unrecognized format: {message}")]
    UnrecognizedFormat {
        /// Description of what was found instead.
        message: String,
    },

    /// The source ended before a fixed-size or declared-size read completed.
    #[error("Unexpected end of data: expected {expected} more bytes")]
    EndOfData {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// A compressed stream contains data that cannot be decoded.
    #[error("Corrupt stream at offset {offset}: {message}")]
    CorruptStream {
        /// Position (bytes or codes, depending on the layer) of the failure.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A structurally valid field names something this reader cannot handle.
    #[error("Unsupported format: {message}")]
    UnsupportedFormat {
        /// Description of the unsupported value.
        message: String,
    },

    /// Bit stream width outside of 1..=24.
    #[error("Invalid bit width: {0} (must be 1-24)")]
    InvalidBitWidth(u8),

    /// An entry name would escape the extraction directory.
    #[error("Path traversal detected in entry: {path}")]
    PathTraversal {
        /// The offending path.
        path: String,
    },
}

/// Result type alias for NuFX operations.
pub type Result<T> = std::result::Result<T, NufxError>;

impl NufxError {
    /// Create an unrecognized format error.
    pub fn unrecognized(message: impl Into<String>) -> Self {
        Self::UnrecognizedFormat {
            message: message.into(),
        }
    }

    /// Create an end of data error.
    pub fn end_of_data(expected: usize) -> Self {
        Self::EndOfData { expected }
    }

    /// Create a corrupt stream error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            offset,
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /// Create a path traversal error.
    pub fn path_traversal(path: impl Into<String>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Returns true if this error means the input was truncated.
    pub fn is_end_of_data(&self) -> bool {
        match self {
            Self::EndOfData { .. } => true,
            Self::Io(err) => err.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

/// Unwraps a `NufxError` that travelled through an `io::Read` boundary.
impl From<io::Error> for NufxError {
    fn from(err: io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<NufxError>()) {
            return Self::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<NufxError>()) {
            Some(Ok(inner)) => *inner,
            _ => Self::Io(io::Error::from(kind)),
        }
    }
}

impl From<NufxError> for io::Error {
    fn from(err: NufxError) -> Self {
        match err {
            NufxError::Io(inner) => inner,
            eod @ NufxError::EndOfData { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, eod),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
