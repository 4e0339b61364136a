//! Codec-level error types.

use nufx_core::NufxError;
use std::io;
use thiserror::Error;

/// LZW, RLE, and chunk framing errors.
#[derive(Debug, Error)]
pub enum LzwError {
    /// A code that is neither in the dictionary nor the next free code.
    #[error("Invalid LZW code {code:#x} at code {position}")]
    InvalidCode {
        /// The offending code.
        code: u32,
        /// Index of the code within the stream.
        position: u64,
    },

    /// A chunk header selecting no known pipeline.
    #[error("Invalid chunk pipeline flag {flag} in chunk {chunk}")]
    InvalidChunkFlag {
        /// Computed pipeline flag.
        flag: u32,
        /// Index of the chunk within the fork.
        chunk: u64,
    },

    /// Maximum code width outside of 9..=24.
    #[error("Invalid maximum code width: {0} (must be 9-24)")]
    InvalidBitWidth(u8),

    /// An RLE escape sequence cut short by the end of its input.
    #[error("Truncated RLE run: {missing} bytes missing")]
    TruncatedRun {
        /// Bytes of the escape sequence that were not available.
        missing: usize,
    },

    /// Error from the underlying streams.
    #[error(transparent)]
    Core(#[from] NufxError),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, LzwError>;

impl From<io::Error> for LzwError {
    fn from(err: io::Error) -> Self {
        Self::Core(NufxError::from(err))
    }
}

impl From<LzwError> for NufxError {
    fn from(err: LzwError) -> Self {
        match err {
            LzwError::InvalidCode { position, .. } => NufxError::corrupted(position, err.to_string()),
            LzwError::InvalidChunkFlag { chunk, .. } => NufxError::corrupted(chunk, err.to_string()),
            LzwError::InvalidBitWidth(width) => NufxError::InvalidBitWidth(width),
            LzwError::TruncatedRun { missing } => NufxError::end_of_data(missing),
            LzwError::Core(inner) => inner,
        }
    }
}

impl From<LzwError> for io::Error {
    fn from(err: LzwError) -> Self {
        NufxError::from(err).into()
    }
}
