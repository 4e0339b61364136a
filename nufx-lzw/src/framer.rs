//! Chunk framing shared by LZW/1 and LZW/2.
//!
//! A compressed fork is a small fork header followed by chunks that each
//! expand to exactly 4096 bytes. Every chunk header selects one of four
//! pipelines; the two formats differ only in their header layouts and in
//! when the LZW dictionary survives a chunk boundary, which is what
//! [`ChunkFormat`] captures.

use crate::config::MIN_BITS;
use crate::decoder::{LzwDecoder, LzwSource};
use crate::encoder::LzwEncoder;
use crate::error::LzwError;
use crate::rle::{self, RleDecoder};
use nufx_core::bitstream::{BitReader, BitWriter};
use nufx_core::bytes::LeReader;
use nufx_core::crc::Crc16;
use nufx_core::{NufxError, Result};
use std::io::{self, Read};
use std::marker::PhantomData;

/// Decoded size of every chunk.
pub const CHUNK_SIZE: usize = 4096;

/// How a chunk's bytes were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPipeline {
    /// Stored as-is.
    Raw,
    /// LZW only.
    Lzw,
    /// RLE only.
    Rle,
    /// RLE first, then LZW over the RLE output.
    LzwThenRle,
}

impl ChunkPipeline {
    /// Map a pipeline flag (0..=3) to a pipeline.
    pub fn from_flag(flag: u32) -> Option<Self> {
        match flag {
            0 => Some(Self::Raw),
            1 => Some(Self::Lzw),
            2 => Some(Self::Rle),
            3 => Some(Self::LzwThenRle),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Lzw => "LZW",
            Self::Rle => "RLE",
            Self::LzwThenRle => "LZW+RLE",
        }
    }
}

/// Per-fork header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkHeader {
    /// CRC-16 of the decoded fork (LZW/1 only).
    pub crc: Option<u16>,
    /// Disk volume number.
    pub volume: u8,
    /// RLE escape byte.
    pub escape: u8,
}

/// Per-chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Length of the chunk after RLE; 4096 means RLE was not applied.
    pub length: u16,
    /// LZW flag byte.
    pub lzw_flag: u8,
    /// Total compressed bytes in the chunk, when the format records it.
    pub total_len: Option<u16>,
}

impl ChunkHeader {
    /// `lzw_flag + (length == 4096 ? 0 : 2)`.
    pub fn pipeline_flag(&self) -> u32 {
        let rle = if usize::from(self.length) == CHUNK_SIZE { 0 } else { 2 };
        u32::from(self.lzw_flag) + rle
    }

    /// The pipeline this header selects.
    pub fn pipeline(&self) -> Option<ChunkPipeline> {
        ChunkPipeline::from_flag(self.pipeline_flag())
    }
}

/// Header layouts and dictionary rules of one chunked LZW format.
pub trait ChunkFormat {
    /// Display name of the format.
    const NAME: &'static str;

    /// Read the header that precedes the first chunk.
    fn read_fork_header<R: Read>(source: &mut LeReader<R>) -> Result<ForkHeader>;

    /// Read a chunk header, or `None` if the source ends cleanly first.
    fn read_chunk_header<R: Read>(source: &mut LeReader<R>) -> Result<Option<ChunkHeader>>;

    /// Whether the LZW dictionary carries over into a chunk with this header.
    fn keeps_dictionary(header: &ChunkHeader) -> bool;
}

/// Read a word, or `None` if the source is already exhausted.
pub(crate) fn read_word_or_end<R: Read>(source: &mut LeReader<R>) -> Result<Option<u16>> {
    let Some(lo) = source.try_read_u8()? else {
        return Ok(None);
    };
    let hi = source.read_u8()?;
    Ok(Some(u16::from_le_bytes([lo, hi])))
}

/// Zero-pad `data` to a whole number of chunks.
pub(crate) fn pad_to_chunks(data: &[u8]) -> Vec<u8> {
    let mut padded = data.to_vec();
    padded.resize(data.len().div_ceil(CHUNK_SIZE) * CHUNK_SIZE, 0);
    padded
}

/// RLE stage of the chunk encoder: the length field and the bytes that
/// go on to the LZW stage. RLE is kept only if it shrinks the chunk.
pub(crate) fn rle_stage(chunk: &[u8], escape: u8) -> (u16, Vec<u8>) {
    let packed = rle::encode(chunk, escape);
    if packed.len() < CHUNK_SIZE {
        (packed.len() as u16, packed)
    } else {
        (CHUNK_SIZE as u16, chunk.to_vec())
    }
}

/// LZW stage of the chunk encoder, ending byte-aligned.
pub(crate) fn lzw_stage(encoder: &mut LzwEncoder, body: &[u8]) -> crate::error::Result<Vec<u8>> {
    let mut bits = BitWriter::new(Vec::with_capacity(body.len()), encoder.width())?;
    encoder.write_all(body, &mut bits)?;
    encoder.end_chunk(&mut bits)?;
    Ok(bits.into_inner()?)
}

/// Decoded byte stream over a chunked LZW fork.
///
/// Each chunk expands to 4096 bytes, so the last chunk of a fork is padded;
/// [`with_limit`](Self::with_limit) trims the stream to the fork's real
/// length. The running CRC always covers whole chunks, padding included,
/// which is how LZW/1 computes its fork CRC.
#[derive(Debug)]
pub struct ChunkReader<R: Read, F: ChunkFormat> {
    /// Compressed source, shared by the raw, RLE, and LZW paths.
    bits: BitReader<LeReader<R>>,
    /// LZW state carried between chunks.
    lzw: LzwDecoder,
    /// RLE state for the current chunk.
    rle: RleDecoder,
    /// Fork header, read before the first chunk.
    fork: Option<ForkHeader>,
    /// Pipeline of the current chunk.
    pipeline: ChunkPipeline,
    /// Bytes left in the current chunk.
    chunk_left: usize,
    /// Chunks started so far.
    chunks: u64,
    /// CRC-16 of every decoded byte.
    crc: Crc16,
    /// False if padding after the limit could not be decoded.
    crc_complete: bool,
    /// Maximum number of bytes handed to the caller.
    limit: Option<u64>,
    /// Bytes handed to the caller.
    produced: u64,
    /// Set once the source is exhausted.
    done: bool,
    _format: PhantomData<F>,
}

impl<R: Read, F: ChunkFormat> ChunkReader<R, F> {
    /// Create a reader over a compressed fork.
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            bits: BitReader::new(LeReader::new(reader), MIN_BITS)?,
            lzw: LzwDecoder::new(),
            rle: RleDecoder::default(),
            fork: None,
            pipeline: ChunkPipeline::Raw,
            chunk_left: 0,
            chunks: 0,
            crc: Crc16::new(),
            crc_complete: true,
            limit: None,
            produced: 0,
            done: false,
            _format: PhantomData,
        })
    }

    /// Stop after `limit` decoded bytes.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The fork header, once the first byte has been requested.
    pub fn fork_header(&self) -> Option<&ForkHeader> {
        self.fork.as_ref()
    }

    /// Number of chunks started so far.
    pub fn chunks_read(&self) -> u64 {
        self.chunks
    }

    /// Number of bytes handed to the caller.
    pub fn bytes_produced(&self) -> u64 {
        self.produced
    }

    /// CRC-16 of all bytes decoded so far.
    pub fn data_crc(&self) -> u16 {
        self.crc.value()
    }

    /// Compare the fork CRC with the decoded data.
    ///
    /// `None` if the format carries no CRC or the fork header has not been
    /// read. Only meaningful after the stream has been read to the end.
    pub fn is_crc_valid(&self) -> Option<bool> {
        let expected = self.fork.as_ref()?.crc?;
        Some(self.crc_complete && expected == self.crc.value())
    }

    /// Next decoded byte, or `None` at the end of the fork.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.done {
            return Ok(None);
        }
        if self.limit.is_some_and(|limit| self.produced >= limit) {
            self.drain_chunk();
            return Ok(None);
        }
        match self.decode_byte()? {
            Some(byte) => {
                self.produced += 1;
                Ok(Some(byte))
            }
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }

    fn decode_byte(&mut self) -> Result<Option<u8>> {
        if self.fork.is_none() {
            let fork = F::read_fork_header(self.bits.get_mut())?;
            log::debug!(
                "{} fork: volume {}, escape {:#04x}, crc {:?}",
                F::NAME,
                fork.volume,
                fork.escape,
                fork.crc
            );
            self.rle = RleDecoder::new(fork.escape);
            self.fork = Some(fork);
        }
        if self.chunk_left == 0 && !self.start_chunk()? {
            return Ok(None);
        }

        let byte = match self.pipeline {
            ChunkPipeline::Raw => self.bits.get_mut().try_read_u8()?,
            ChunkPipeline::Lzw => self.lzw.read_byte(&mut self.bits)?,
            ChunkPipeline::Rle => self.rle.read_byte(self.bits.get_mut())?,
            ChunkPipeline::LzwThenRle => {
                let mut source = LzwSource {
                    decoder: &mut self.lzw,
                    bits: &mut self.bits,
                };
                self.rle.read_byte(&mut source)?
            }
        };

        let Some(byte) = byte else {
            return Err(NufxError::end_of_data(self.chunk_left));
        };
        self.chunk_left -= 1;
        self.crc.update_byte(byte);
        Ok(Some(byte))
    }

    fn start_chunk(&mut self) -> Result<bool> {
        let Some(header) = F::read_chunk_header(self.bits.get_mut())? else {
            return Ok(false);
        };
        let Some(pipeline) = header.pipeline() else {
            return Err(LzwError::InvalidChunkFlag {
                flag: header.pipeline_flag(),
                chunk: self.chunks,
            }
            .into());
        };

        self.lzw.clear_data(&mut self.bits);
        if !F::keeps_dictionary(&header) {
            self.lzw.clear_dictionary(&mut self.bits)?;
        }
        self.rle.reset();
        log::trace!(
            "{} chunk {}: {} ({} bytes after RLE)",
            F::NAME,
            self.chunks,
            pipeline.name(),
            header.length
        );

        self.pipeline = pipeline;
        self.chunk_left = CHUNK_SIZE;
        self.chunks += 1;
        Ok(true)
    }

    /// Decode the padding left in the current chunk so the CRC covers it.
    fn drain_chunk(&mut self) {
        while self.chunk_left > 0 {
            if let Err(err) = self.decode_byte() {
                log::debug!("{} padding not decodable: {}", F::NAME, err);
                self.crc_complete = false;
                break;
            }
        }
        self.done = true;
    }
}

impl<R: Read, F: ChunkFormat> Read for ChunkReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.read_byte()? {
                Some(byte) => {
                    buf[written] = byte;
                    written += 1;
                }
                None => break,
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_selection() {
        let header = |length, lzw_flag| ChunkHeader {
            length,
            lzw_flag,
            total_len: None,
        };
        assert_eq!(header(4096, 0).pipeline(), Some(ChunkPipeline::Raw));
        assert_eq!(header(4096, 1).pipeline(), Some(ChunkPipeline::Lzw));
        assert_eq!(header(1200, 0).pipeline(), Some(ChunkPipeline::Rle));
        assert_eq!(header(1200, 1).pipeline(), Some(ChunkPipeline::LzwThenRle));
        assert_eq!(header(4096, 2).pipeline(), Some(ChunkPipeline::Rle));
        assert_eq!(header(10, 2).pipeline_flag(), 4);
        assert_eq!(header(10, 2).pipeline(), None);
    }

    #[test]
    fn test_pipeline_names() {
        assert_eq!(ChunkPipeline::LzwThenRle.name(), "LZW+RLE");
        assert_eq!(ChunkPipeline::from_flag(0), Some(ChunkPipeline::Raw));
        assert_eq!(ChunkPipeline::from_flag(9), None);
    }
}
