//! LZW/1: ShrinkIt's original chunked format.
//!
//! ```text
//! fork:  crc16 (word) | volume (byte) | escape (byte) | chunk*
//! chunk: rle length (word) | lzw flag (byte) | body
//! ```
//!
//! The dictionary is reset at every chunk, and the fork CRC covers the
//! decoded chunks including the zero padding of the last one.

use crate::config::LzwConfig;
use crate::encoder::LzwEncoder;
use crate::error::Result;
use crate::framer::{
    self, CHUNK_SIZE, ChunkFormat, ChunkHeader, ChunkReader, ForkHeader, read_word_or_end,
};
use nufx_core::bytes::{LeReader, LeWriter};
use nufx_core::crc::Crc16;
use std::io::Read;

/// LZW/1 framing rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzw1;

impl ChunkFormat for Lzw1 {
    const NAME: &'static str = "LZW/1";

    fn read_fork_header<R: Read>(source: &mut LeReader<R>) -> nufx_core::Result<ForkHeader> {
        let crc = source.read_word()?;
        let volume = source.read_u8()?;
        let escape = source.read_u8()?;
        Ok(ForkHeader {
            crc: Some(crc),
            volume,
            escape,
        })
    }

    fn read_chunk_header<R: Read>(
        source: &mut LeReader<R>,
    ) -> nufx_core::Result<Option<ChunkHeader>> {
        let Some(length) = read_word_or_end(source)? else {
            return Ok(None);
        };
        let lzw_flag = source.read_u8()?;
        Ok(Some(ChunkHeader {
            length,
            lzw_flag,
            total_len: None,
        }))
    }

    fn keeps_dictionary(_header: &ChunkHeader) -> bool {
        false
    }
}

/// Streaming LZW/1 decompressor.
pub type Lzw1Reader<R> = ChunkReader<R, Lzw1>;

/// Compress `data` as an LZW/1 fork.
///
/// Each chunk is RLE-packed if that helps and LZW-packed if that helps
/// further. The output always covers whole chunks; callers record the real
/// length separately.
pub fn compress(data: &[u8], volume: u8, escape: u8) -> Result<Vec<u8>> {
    let padded = framer::pad_to_chunks(data);
    let mut out = LeWriter::new(Vec::with_capacity(data.len() / 2 + 4));
    out.write_word(Crc16::compute(&padded))?;
    out.write_u8(volume)?;
    out.write_u8(escape)?;

    for chunk in padded.chunks(CHUNK_SIZE) {
        let (length, body) = framer::rle_stage(chunk, escape);
        let mut encoder = LzwEncoder::new(LzwConfig::NUFX)?;
        let packed = framer::lzw_stage(&mut encoder, &body)?;

        out.write_word(length)?;
        if packed.len() < body.len() {
            out.write_u8(1)?;
            out.write_bytes(&packed)?;
        } else {
            out.write_u8(0)?;
            out.write_bytes(&body)?;
        }
    }
    Ok(out.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rle::DEFAULT_ESCAPE;
    use nufx_core::NufxError;

    fn decompress(packed: &[u8], len: u64) -> (Vec<u8>, Option<bool>) {
        let mut reader = Lzw1Reader::new(packed).unwrap().with_limit(len);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        (out, reader.is_crc_valid())
    }

    #[test]
    fn test_raw_chunk() {
        let body: Vec<u8> = (0..CHUNK_SIZE).map(|i| (i * 7 % 251) as u8).collect();
        let mut packed = Vec::new();
        packed.extend_from_slice(&Crc16::compute(&body).to_le_bytes());
        packed.extend_from_slice(&[0, DEFAULT_ESCAPE, 0x00, 0x10, 0]);
        packed.extend_from_slice(&body);

        let (out, crc_ok) = decompress(&packed, CHUNK_SIZE as u64);
        assert_eq!(out, body);
        assert_eq!(crc_ok, Some(true));
    }

    #[test]
    fn test_round_trip_short_text() {
        let data = b"Apple IIgs System Disk 6.0.1";
        let packed = compress(data, 0, DEFAULT_ESCAPE).unwrap();
        assert!(packed.len() < CHUNK_SIZE);

        let (out, crc_ok) = decompress(&packed, data.len() as u64);
        assert_eq!(out, data);
        assert_eq!(crc_ok, Some(true));
    }

    #[test]
    fn test_round_trip_multiple_chunks() {
        let data: Vec<u8> = (0..3 * CHUNK_SIZE + 100)
            .map(|i| if i % 900 < 300 { 0 } else { (i % 61) as u8 })
            .collect();
        let packed = compress(&data, 3, DEFAULT_ESCAPE).unwrap();

        let mut reader = Lzw1Reader::new(packed.as_slice())
            .unwrap()
            .with_limit(data.len() as u64);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(reader.chunks_read(), 4);
        assert_eq!(reader.fork_header().map(|f| f.volume), Some(3));
        assert_eq!(reader.is_crc_valid(), Some(true));
    }

    #[test]
    fn test_incompressible_chunk_is_stored() {
        let mut state = 0x1234_5678u32;
        let data: Vec<u8> = (0..CHUNK_SIZE)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let packed = compress(&data, 0, DEFAULT_ESCAPE).unwrap();
        // fork header + chunk header + the chunk verbatim
        assert_eq!(packed.len(), 4 + 3 + CHUNK_SIZE);
        assert_eq!(packed[4..7], [0x00, 0x10, 0x00]);
        assert_eq!(decompress(&packed, CHUNK_SIZE as u64).0, data);
    }

    #[test]
    fn test_crc_mismatch() {
        let data = vec![0x41u8; 5000];
        let mut packed = compress(&data, 0, DEFAULT_ESCAPE).unwrap();
        packed[0] ^= 0xff;
        let (out, crc_ok) = decompress(&packed, data.len() as u64);
        assert_eq!(out, data);
        assert_eq!(crc_ok, Some(false));
    }

    #[test]
    fn test_invalid_chunk_flag() {
        let mut packed = vec![0, 0, 0, DEFAULT_ESCAPE, 0x00, 0x10, 7];
        packed.extend_from_slice(&[0u8; 16]);
        let mut reader = Lzw1Reader::new(packed.as_slice()).unwrap();
        let err = reader.read_byte().unwrap_err();
        assert!(matches!(err, NufxError::CorruptStream { .. }));
    }

    #[test]
    fn test_truncated_chunk() {
        let mut packed = vec![0, 0, 0, DEFAULT_ESCAPE, 0x00, 0x10, 0];
        packed.extend_from_slice(&[9u8; 100]);
        let mut out = Vec::new();
        let err = Lzw1Reader::new(packed.as_slice())
            .unwrap()
            .read_to_end(&mut out)
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_empty_fork() {
        let packed = compress(&[], 0, DEFAULT_ESCAPE).unwrap();
        assert_eq!(packed.len(), 4);
        let (out, crc_ok) = decompress(&packed, 0);
        assert!(out.is_empty());
        assert_eq!(crc_ok, None);
    }
}
