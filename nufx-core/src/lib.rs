//! # NuFX Core
//!
//! Core components for reading NuFX (ShrinkIt) archives.
//!
//! This crate provides the building blocks every other layer sits on:
//!
//! - [`crc`]: CRC-16/XMODEM, the checksum used by NuFX headers and forks
//! - [`bytes`]: little-endian readers/writers with running CRC and
//!   signature scanning
//! - [`bitstream`]: variable-width code readers/writers for LZW
//! - [`timerec`]: Apple IIgs date records
//! - [`traits`]: the pull-based [`ByteSource`] seam between codecs
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     list, info, test, extract, scan                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Archive structure                                   │
//! │     master header, header blocks, thread records        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codecs                                              │
//! │     LZW/1 and LZW/2 chunk framing, LZW, RLE             │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Streams (this crate)                                │
//! │     LeReader/LeWriter, BitReader/BitWriter, CRC-16      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use nufx_core::bytes::{LeReader, Signature, NUFILE_ID};
//! use nufx_core::crc::Crc16;
//! use std::io::Cursor;
//!
//! let mut reader = LeReader::new(Cursor::new(NUFILE_ID.to_vec()));
//! assert_eq!(reader.seek_signature(6).unwrap(), Signature::NuFile);
//!
//! assert_eq!(Crc16::compute(b"123456789"), 0x31C3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod bytes;
pub mod crc;
pub mod error;
pub mod timerec;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use bytes::{LeReader, LeWriter, Signature};
pub use crc::Crc16;
pub use error::{NufxError, Result};
pub use traits::{ByteSource, SliceSource};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::bytes::{LeReader, LeWriter, Signature};
    pub use crate::crc::Crc16;
    pub use crate::error::{NufxError, Result};
    pub use crate::traits::ByteSource;
}
