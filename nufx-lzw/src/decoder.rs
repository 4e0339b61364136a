//! LZW decoder.
//!
//! The decoder is a state object rather than a stream: it does not own its
//! bit source. Chunk framers keep one [`LzwDecoder`] alive across chunks and
//! decide when its dictionary survives a chunk boundary, so the bit reader
//! is passed in on every call and the resets are explicit methods.

use crate::config::{CLEAR_CODE, MIN_BITS};
use crate::dictionary::LzwDictionary;
use crate::error::{LzwError, Result};
use nufx_core::bitstream::BitReader;
use nufx_core::traits::ByteSource;
use std::io::{self, Read};

/// Adaptive LZW decoder with the 0x100 clear code.
#[derive(Debug, Clone)]
pub struct LzwDecoder {
    /// Code table.
    dict: LzwDictionary,
    /// Previous code ("w"); `None` right after a reset.
    prev: Option<u32>,
    /// Decoded bytes of the last code not yet handed out.
    pending: Vec<u8>,
    /// Read position in `pending`.
    pending_pos: usize,
    /// Codes consumed since creation.
    codes_read: u64,
}

impl LzwDecoder {
    /// Create a decoder with a fresh dictionary.
    pub fn new() -> Self {
        Self {
            dict: LzwDictionary::new(),
            prev: None,
            pending: Vec::with_capacity(64),
            pending_pos: 0,
            codes_read: 0,
        }
    }

    /// Current dictionary size.
    pub fn dictionary_len(&self) -> u32 {
        self.dict.len()
    }

    /// Number of codes consumed so far.
    pub fn codes_read(&self) -> u64 {
        self.codes_read
    }

    /// Reset the dictionary, drop the previous code, and return the bit
    /// reader to 9-bit codes. Also performs [`clear_data`](Self::clear_data).
    pub fn clear_dictionary<R: Read>(&mut self, bits: &mut BitReader<R>) -> Result<()> {
        self.dict.reset();
        self.prev = None;
        bits.set_width(MIN_BITS)?;
        self.clear_data(bits);
        Ok(())
    }

    /// Drop buffered bits and undelivered output, keeping the dictionary
    /// and the previous code.
    pub fn clear_data<R: Read>(&mut self, bits: &mut BitReader<R>) {
        bits.clear_buffered();
        self.pending.clear();
        self.pending_pos = 0;
    }

    /// Next decoded byte, or `None` once the bit source is exhausted.
    pub fn read_byte<R: Read>(&mut self, bits: &mut BitReader<R>) -> Result<Option<u8>> {
        if self.pending_pos >= self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
            if !self.fill(bits)? {
                return Ok(None);
            }
        }
        let byte = self.pending[self.pending_pos];
        self.pending_pos += 1;
        Ok(Some(byte))
    }

    /// Decode into `buf`, returning the number of bytes written.
    pub fn read_into<R: Read>(&mut self, bits: &mut BitReader<R>, buf: &mut [u8]) -> Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.read_byte(bits)? {
                Some(byte) => {
                    buf[written] = byte;
                    written += 1;
                }
                None => break,
            }
        }
        Ok(written)
    }

    /// Decode one code into `pending`. Returns false at end of input.
    fn fill<R: Read>(&mut self, bits: &mut BitReader<R>) -> Result<bool> {
        loop {
            let Some(code) = bits.read_code()? else {
                return Ok(false);
            };
            let position = self.codes_read;
            self.codes_read += 1;

            if code == CLEAR_CODE {
                self.dict.reset();
                self.prev = None;
                bits.set_width(MIN_BITS)?;
                continue;
            }

            let Some(prev) = self.prev else {
                if code > 0xFF {
                    return Err(LzwError::InvalidCode { code, position });
                }
                self.pending.push(code as u8);
                self.prev = Some(code);
                return Ok(true);
            };

            let next = self.dict.len();
            let first = if code < next {
                self.dict.expand_into(code, &mut self.pending);
                self.dict.first_byte(code)
            } else if code == next {
                // KwK: the code being defined by this very step.
                self.dict.expand_into(prev, &mut self.pending);
                let first = self.dict.first_byte(prev);
                self.pending.push(first);
                first
            } else {
                return Err(LzwError::InvalidCode { code, position });
            };

            self.dict.push(prev, first);
            if self.dict.len() ^ bits.mask() == 0 {
                bits.increase_width()?;
            }
            self.prev = Some(code);
            return Ok(true);
        }
    }
}

impl Default for LzwDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed decoder plus bit source, usable as a [`ByteSource`].
pub(crate) struct LzwSource<'a, R: Read> {
    pub(crate) decoder: &'a mut LzwDecoder,
    pub(crate) bits: &'a mut BitReader<R>,
}

impl<R: Read> ByteSource for LzwSource<'_, R> {
    fn next_byte(&mut self) -> nufx_core::Result<Option<u8>> {
        Ok(self.decoder.read_byte(&mut *self.bits)?)
    }
}

/// Streaming LZW decompressor over a plain byte source.
#[derive(Debug)]
pub struct LzwReader<R: Read> {
    bits: BitReader<R>,
    decoder: LzwDecoder,
}

impl<R: Read> LzwReader<R> {
    /// Create a reader decoding LZW codes from `reader`.
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            bits: BitReader::new(reader, MIN_BITS)?,
            decoder: LzwDecoder::new(),
        })
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.bits.into_inner()
    }
}

impl<R: Read> Read for LzwReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.decoder.read_into(&mut self.bits, buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nufx_core::bitstream::BitWriter;
    use std::io::Cursor;

    /// Pack codes the way the decoder expects: 9 bits, widening after the
    /// code that brings the decoder's dictionary to the mask.
    fn pack(codes: &[(u32, u8)]) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new(), 9).unwrap();
        for &(code, width) in codes {
            writer.set_width(width).unwrap();
            writer.write_code(code).unwrap();
        }
        writer.into_inner().unwrap()
    }

    fn decode_all(data: Vec<u8>) -> Result<Vec<u8>> {
        let mut bits = BitReader::new(Cursor::new(data), 9)?;
        let mut decoder = LzwDecoder::new();
        let mut out = Vec::new();
        while let Some(byte) = decoder.read_byte(&mut bits)? {
            out.push(byte);
        }
        Ok(out)
    }

    #[test]
    fn test_literals_and_dictionary_codes() {
        // "ABABABA": A, B, AB(257), ABA(259, KwK)
        let data = pack(&[(65, 9), (66, 9), (257, 9), (259, 9)]);
        assert_eq!(decode_all(data).unwrap(), b"ABABABA");
    }

    #[test]
    fn test_kwk_first_pair() {
        // "AAA": A, then 257 defined by the same step.
        let data = pack(&[(65, 9), (257, 9)]);
        assert_eq!(decode_all(data).unwrap(), b"AAA");
    }

    #[test]
    fn test_clear_code_resets() {
        let data = pack(&[(65, 9), (66, 9), (CLEAR_CODE, 9), (67, 9), (257, 9)]);
        assert_eq!(decode_all(data).unwrap(), b"ABCCC");
    }

    #[test]
    fn test_invalid_code() {
        let data = pack(&[(65, 9), (300, 9)]);
        let err = decode_all(data).unwrap_err();
        assert!(matches!(
            err,
            LzwError::InvalidCode {
                code: 300,
                position: 1
            }
        ));
    }

    #[test]
    fn test_invalid_first_code() {
        let data = pack(&[(257, 9)]);
        assert!(matches!(
            decode_all(data),
            Err(LzwError::InvalidCode { code: 257, .. })
        ));
    }

    #[test]
    fn test_width_growth() {
        // 254 literal codes after the first add entries 257..=510; the
        // dictionary then holds 511 entries and codes widen to 10 bits.
        let mut codes: Vec<(u32, u8)> = (0..255u32).map(|b| (b, 9)).collect();
        codes.push((0x41, 10));
        let data = pack(&codes);

        let mut bits = BitReader::new(Cursor::new(data), 9).unwrap();
        let mut decoder = LzwDecoder::new();
        let mut out = Vec::new();
        while let Some(byte) = decoder.read_byte(&mut bits).unwrap() {
            out.push(byte);
        }
        assert_eq!(out.len(), 256);
        assert_eq!(out[255], 0x41);
        assert_eq!(bits.width(), 10);
        assert_eq!(decoder.dictionary_len(), 512);
    }

    #[test]
    fn test_clear_data_keeps_dictionary() {
        let mut bits = BitReader::new(Cursor::new(pack(&[(65, 9), (66, 9)])), 9).unwrap();
        let mut decoder = LzwDecoder::new();
        assert_eq!(decoder.read_byte(&mut bits).unwrap(), Some(b'A'));
        assert_eq!(decoder.read_byte(&mut bits).unwrap(), Some(b'B'));
        decoder.clear_data(&mut bits);
        assert_eq!(decoder.dictionary_len(), 258);
        decoder.clear_dictionary(&mut bits).unwrap();
        assert_eq!(decoder.dictionary_len(), 257);
        assert_eq!(bits.width(), 9);
    }

    #[test]
    fn test_reader() {
        let data = pack(&[(72, 9), (105, 9)]);
        let mut out = String::new();
        LzwReader::new(Cursor::new(data))
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "Hi");
    }
}
