//! # NuFX-LZW: ShrinkIt Compression in Pure Rust
//!
//! This crate implements the codecs found inside NuFX archives:
//!
//! - **LZW**: 9 to 12 bit codes, LSB-first, with `0x100` as an in-band
//!   clear code and the dictionary widening as soon as it reaches the
//!   current mask
//! - **RLE**: `escape, byte, count - 1` run sequences
//! - **LZW/1** and **LZW/2**: the chunked fork formats of ShrinkIt and
//!   GS/ShrinkIt, which combine the two per 4096-byte chunk
//!
//! ## LZW/1 vs. LZW/2
//!
//! | | LZW/1 | LZW/2 |
//! |---|---|---|
//! | Fork CRC | yes | no |
//! | Chunk header | length word, flag byte | flagged length word, total word |
//! | Dictionary | reset every chunk | kept across LZW chunks |
//!
//! ## Example
//!
//! ```rust
//! use nufx_lzw::{Lzw2Reader, lzw2};
//! use std::io::Read;
//!
//! let original = b"TOBEORNOTTOBEORTOBEORNOT";
//! let packed = lzw2::compress(original, 0, 0xDB).unwrap();
//!
//! let mut reader = Lzw2Reader::new(packed.as_slice())
//!     .unwrap()
//!     .with_limit(original.len() as u64);
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out).unwrap();
//! assert_eq!(out, original);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod config;
mod decoder;
mod dictionary;
mod encoder;
mod error;
pub mod framer;
pub mod lzw1;
pub mod lzw2;
pub mod rle;

pub use config::{CLEAR_CODE, LzwConfig, MIN_BITS};
pub use decoder::{LzwDecoder, LzwReader};
pub use dictionary::LzwDictionary;
pub use encoder::{LzwEncoder, LzwWriter};
pub use error::{LzwError, Result};
pub use framer::{CHUNK_SIZE, ChunkFormat, ChunkHeader, ChunkPipeline, ChunkReader, ForkHeader};
pub use lzw1::{Lzw1, Lzw1Reader};
pub use lzw2::{Lzw2, Lzw2Reader};
pub use rle::{RleDecoder, RleEncoder, RleReader, RleWriter};

/// Decompress a bare LZW stream (no chunk framing).
///
/// # Example
///
/// ```rust
/// use nufx_lzw::{compress, decompress, LzwConfig};
///
/// let original = b"Hello, World!";
/// let packed = compress(original, LzwConfig::NUFX).unwrap();
/// assert_eq!(decompress(&packed).unwrap(), original);
/// ```
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut bits = nufx_core::BitReader::new(data, MIN_BITS)?;
    let mut decoder = LzwDecoder::new();
    let mut out = Vec::with_capacity(data.len() * 2);
    while let Some(byte) = decoder.read_byte(&mut bits)? {
        out.push(byte);
    }
    Ok(out)
}

/// Compress data as a bare LZW stream (no chunk framing).
pub fn compress(data: &[u8], config: LzwConfig) -> Result<Vec<u8>> {
    let mut bits = nufx_core::BitWriter::new(Vec::with_capacity(data.len() / 2), MIN_BITS)?;
    let mut encoder = LzwEncoder::new(config)?;
    encoder.write_all(data, &mut bits)?;
    encoder.finish(&mut bits)?;
    Ok(bits.into_inner()?)
}
