//! LZW/2: the GS/ShrinkIt revision of the chunked format.
//!
//! ```text
//! fork:  volume (byte) | escape (byte) | chunk*
//! chunk: flag:1 rle length:15 (word) | [total length (word)] | body
//! ```
//!
//! The high bit of the first chunk word marks an LZW chunk, which is
//! followed by the total compressed length of the chunk. An LZW chunk
//! continues the dictionary of the chunk before it; any other chunk resets
//! it. There is no fork CRC.

use crate::config::LzwConfig;
use crate::encoder::LzwEncoder;
use crate::error::Result;
use crate::framer::{
    self, CHUNK_SIZE, ChunkFormat, ChunkHeader, ChunkReader, ForkHeader, read_word_or_end,
};
use nufx_core::bytes::{LeReader, LeWriter};
use std::io::Read;

const LZW_FLAG: u16 = 0x8000;
const LENGTH_MASK: u16 = 0x7fff;

/// Bytes of an LZW chunk header.
const LZW_CHUNK_HEADER_LEN: usize = 4;

/// LZW/2 framing rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzw2;

impl ChunkFormat for Lzw2 {
    const NAME: &'static str = "LZW/2";

    fn read_fork_header<R: Read>(source: &mut LeReader<R>) -> nufx_core::Result<ForkHeader> {
        let volume = source.read_u8()?;
        let escape = source.read_u8()?;
        Ok(ForkHeader {
            crc: None,
            volume,
            escape,
        })
    }

    fn read_chunk_header<R: Read>(
        source: &mut LeReader<R>,
    ) -> nufx_core::Result<Option<ChunkHeader>> {
        let Some(word) = read_word_or_end(source)? else {
            return Ok(None);
        };
        let lzw = word & LZW_FLAG != 0;
        let total_len = if lzw {
            Some(source.read_word()?)
        } else {
            None
        };
        Ok(Some(ChunkHeader {
            length: word & LENGTH_MASK,
            lzw_flag: u8::from(lzw),
            total_len,
        }))
    }

    fn keeps_dictionary(header: &ChunkHeader) -> bool {
        header.lzw_flag != 0
    }
}

/// Streaming LZW/2 decompressor.
pub type Lzw2Reader<R> = ChunkReader<R, Lzw2>;

/// Compress `data` as an LZW/2 fork.
///
/// The dictionary runs on from one LZW chunk to the next, so each chunk is
/// trial-compressed with a copy of the running encoder and the copy is
/// kept only if the chunk is stored as LZW.
pub fn compress(data: &[u8], volume: u8, escape: u8) -> Result<Vec<u8>> {
    let padded = framer::pad_to_chunks(data);
    let mut out = LeWriter::new(Vec::with_capacity(data.len() / 2 + 2));
    out.write_u8(volume)?;
    out.write_u8(escape)?;

    let mut encoder = LzwEncoder::new(LzwConfig::NUFX)?;
    for chunk in padded.chunks(CHUNK_SIZE) {
        let (length, body) = framer::rle_stage(chunk, escape);
        let mut trial = encoder.clone();
        let packed = framer::lzw_stage(&mut trial, &body)?;

        if packed.len() < body.len() {
            out.write_word(length | LZW_FLAG)?;
            out.write_word((packed.len() + LZW_CHUNK_HEADER_LEN) as u16)?;
            out.write_bytes(&packed)?;
            encoder = trial;
        } else {
            out.write_word(length)?;
            out.write_bytes(&body)?;
            encoder = LzwEncoder::new(LzwConfig::NUFX)?;
        }
    }
    Ok(out.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::ChunkPipeline;
    use crate::rle::DEFAULT_ESCAPE;

    fn decompress(packed: &[u8], len: u64) -> Vec<u8> {
        let mut reader = Lzw2Reader::new(packed).unwrap().with_limit(len);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(reader.is_crc_valid(), None);
        out
    }

    #[test]
    fn test_chunk_header_layout() {
        let mut source = LeReader::new(&[0x34, 0x92, 0x10, 0x02][..]);
        let header = Lzw2::read_chunk_header(&mut source).unwrap().unwrap();
        assert_eq!(header.length, 0x1234);
        assert_eq!(header.lzw_flag, 1);
        assert_eq!(header.total_len, Some(0x0210));
        assert_eq!(header.pipeline(), Some(ChunkPipeline::LzwThenRle));
        assert!(Lzw2::keeps_dictionary(&header));

        let mut source = LeReader::new(&[0x00, 0x10][..]);
        let header = Lzw2::read_chunk_header(&mut source).unwrap().unwrap();
        assert_eq!(header.pipeline(), Some(ChunkPipeline::Raw));
        assert!(!Lzw2::keeps_dictionary(&header));
        assert!(Lzw2::read_chunk_header(&mut source).unwrap().is_none());
    }

    #[test]
    fn test_round_trip_text() {
        let data = b"ProDOS 8 v2.0.3 / BASIC.SYSTEM / FINDER.DATA ".repeat(300);
        let packed = compress(&data, 1, DEFAULT_ESCAPE).unwrap();
        assert!(packed.len() < data.len() / 4);
        assert_eq!(decompress(&packed, data.len() as u64), data);
    }

    #[test]
    fn test_dictionary_spans_chunks() {
        let words = ["apple ", "basic ", "disk ", "prodos ", "shrink ", "volume "];
        let mut data = Vec::new();
        let mut i = 0usize;
        while data.len() < 3 * CHUNK_SIZE {
            data.extend_from_slice(words[(i * i + 3 * i) % words.len()].as_bytes());
            i += 1;
        }
        let packed = compress(&data, 0, DEFAULT_ESCAPE).unwrap();

        // Chunk one word lies right after the fork header.
        assert_ne!(u16::from_le_bytes([packed[2], packed[3]]) & LZW_FLAG, 0);
        assert_eq!(decompress(&packed, data.len() as u64), data);
    }

    #[test]
    fn test_total_length_points_at_next_chunk() {
        let data = vec![0x20u8; 2 * CHUNK_SIZE];
        let packed = compress(&data, 0, DEFAULT_ESCAPE).unwrap();
        let total = usize::from(u16::from_le_bytes([packed[4], packed[5]]));
        let next = u16::from_le_bytes([packed[2 + total], packed[3 + total]]);
        assert_ne!(next & LZW_FLAG, 0);
    }

    #[test]
    fn test_mixed_raw_and_lzw_chunks() {
        let mut state = 0x9e37_79b9u32;
        let mut data: Vec<u8> = (0..CHUNK_SIZE)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 8) as u8
            })
            .collect();
        data.extend(std::iter::repeat_n(0xDB, CHUNK_SIZE));
        data.extend(b"after the run".iter().copied());
        let packed = compress(&data, 0, DEFAULT_ESCAPE).unwrap();

        // The random chunk is stored as-is.
        assert_eq!(u16::from_le_bytes([packed[2], packed[3]]), 0x1000);
        assert_eq!(decompress(&packed, data.len() as u64), data);
    }

    #[test]
    fn test_limit_trims_padding() {
        let data = b"short";
        let packed = compress(data, 0, DEFAULT_ESCAPE).unwrap();
        assert_eq!(decompress(&packed, 3), b"sho");

        let mut reader = Lzw2Reader::new(packed.as_slice()).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out.len(), CHUNK_SIZE);
        assert_eq!(&out[..5], data);
    }
}
