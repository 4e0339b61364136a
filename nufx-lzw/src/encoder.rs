//! LZW encoder.
//!
//! The encoder mirrors [`LzwDecoder`](crate::LzwDecoder) exactly. The
//! decoder only learns a string one code after the encoder invents it, so
//! the encoder tracks the dictionary size *the decoder* will have and
//! widens its codes at the same moment the decoder does. Before that size
//! would force codes wider than the configured ceiling, it emits the 0x100
//! clear code and starts over.

use crate::config::{CLEAR_CODE, INITIAL_DICTIONARY_LEN, LzwConfig, MIN_BITS};
use crate::dictionary::LzwDictionary;
use crate::error::Result;
use nufx_core::bitstream::BitWriter;
use std::io::{self, Write};

/// Adaptive LZW encoder with the 0x100 clear code.
#[derive(Debug, Clone)]
pub struct LzwEncoder {
    /// Configuration.
    config: LzwConfig,
    /// Encoder-side code table.
    dict: LzwDictionary,
    /// Code of the longest match so far.
    current: Option<u32>,
    /// Last code of the previous chunk, still owed a dictionary entry.
    link: Option<u32>,
    /// Whether a code has been emitted since the last reset.
    emitted: bool,
    /// Dictionary size as the decoder sees it.
    decoder_len: u32,
    /// Width of the next code.
    width: u8,
    /// A clear code is due before the next string.
    clear_pending: bool,
}

impl LzwEncoder {
    /// Create an encoder with a fresh dictionary.
    pub fn new(config: LzwConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            dict: LzwDictionary::new(),
            current: None,
            link: None,
            emitted: false,
            decoder_len: INITIAL_DICTIONARY_LEN,
            width: MIN_BITS,
            clear_pending: false,
        })
    }

    /// The encoder's configuration.
    pub fn config(&self) -> &LzwConfig {
        &self.config
    }

    /// Width of the next code.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Feed one byte.
    pub fn write_byte<W: Write>(&mut self, byte: u8, bits: &mut BitWriter<W>) -> Result<()> {
        let Some(prefix) = self.current else {
            if self.clear_pending {
                self.emit_clear(bits)?;
            } else if let Some(link) = self.link.take() {
                // The decoder will pair the last code of the previous chunk
                // with the first byte of this one.
                self.dict.insert(link, byte);
            }
            self.current = Some(u32::from(byte));
            return Ok(());
        };

        if let Some(code) = self.dict.find(prefix, byte) {
            self.current = Some(code);
            return Ok(());
        }

        self.emit(prefix, bits)?;
        self.dict.insert(prefix, byte);
        self.current = Some(u32::from(byte));

        if self.decoder_len >= self.config.clear_threshold() {
            self.emit_clear(bits)?;
        }
        Ok(())
    }

    /// Feed a slice of bytes.
    pub fn write_all<W: Write>(&mut self, data: &[u8], bits: &mut BitWriter<W>) -> Result<()> {
        for &byte in data {
            self.write_byte(byte, bits)?;
        }
        Ok(())
    }

    /// End a chunk: emit the pending string and byte-align the output while
    /// keeping the dictionary for the next chunk.
    ///
    /// A clear code that falls due here is deferred to the start of the next
    /// chunk, since a framed reader stops reading codes once a chunk's
    /// output is complete.
    pub fn end_chunk<W: Write>(&mut self, bits: &mut BitWriter<W>) -> Result<()> {
        if let Some(code) = self.current.take() {
            self.emit(code, bits)?;
            if self.decoder_len >= self.config.clear_threshold() {
                self.clear_pending = true;
            } else {
                self.link = Some(code);
            }
        }
        bits.align()?;
        Ok(())
    }

    /// Emit the pending string and flush the final partial byte.
    pub fn finish<W: Write>(&mut self, bits: &mut BitWriter<W>) -> Result<()> {
        if let Some(code) = self.current.take() {
            self.emit(code, bits)?;
        }
        self.link = None;
        bits.finish()?;
        Ok(())
    }

    fn emit<W: Write>(&mut self, code: u32, bits: &mut BitWriter<W>) -> Result<()> {
        bits.set_width(self.width)?;
        bits.write_code(code)?;
        if self.emitted {
            self.decoder_len += 1;
            if self.decoder_len ^ bits.mask() == 0 {
                self.width += 1;
            }
        } else {
            self.emitted = true;
        }
        Ok(())
    }

    fn emit_clear<W: Write>(&mut self, bits: &mut BitWriter<W>) -> Result<()> {
        log::trace!("LZW clear at decoder dictionary size {}", self.decoder_len);
        bits.set_width(self.width)?;
        bits.write_code(CLEAR_CODE)?;
        self.dict.reset();
        self.link = None;
        self.emitted = false;
        self.decoder_len = INITIAL_DICTIONARY_LEN;
        self.width = MIN_BITS;
        self.clear_pending = false;
        Ok(())
    }
}

/// Streaming LZW compressor over a plain byte sink.
///
/// Call [`finish`](Self::finish) to emit the last code; dropping the writer
/// loses it.
#[derive(Debug)]
pub struct LzwWriter<W: Write> {
    bits: BitWriter<W>,
    encoder: LzwEncoder,
}

impl<W: Write> LzwWriter<W> {
    /// Create a writer compressing into `writer`.
    pub fn new(writer: W, config: LzwConfig) -> Result<Self> {
        Ok(Self {
            bits: BitWriter::new(writer, MIN_BITS)?,
            encoder: LzwEncoder::new(config)?,
        })
    }

    /// Emit the last code, flush, and return the underlying sink.
    pub fn finish(mut self) -> Result<W> {
        self.encoder.finish(&mut self.bits)?;
        Ok(self.bits.into_inner()?)
    }
}

impl<W: Write> Write for LzwWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.encoder.write_all(buf, &mut self.bits)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.bits.get_mut().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::LzwDecoder;
    use nufx_core::bitstream::BitReader;
    use std::io::Cursor;

    fn encode(data: &[u8], config: LzwConfig) -> Vec<u8> {
        let mut bits = BitWriter::new(Vec::new(), MIN_BITS).unwrap();
        let mut encoder = LzwEncoder::new(config).unwrap();
        encoder.write_all(data, &mut bits).unwrap();
        encoder.finish(&mut bits).unwrap();
        bits.into_inner().unwrap()
    }

    fn codes(data: Vec<u8>, widths: &[u8]) -> Vec<u32> {
        let mut reader = BitReader::new(Cursor::new(data), 9).unwrap();
        widths
            .iter()
            .map(|&w| {
                reader.set_width(w).unwrap();
                reader.read_code().unwrap().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_code_sequence() {
        let out = encode(b"ABABABA", LzwConfig::NUFX);
        assert_eq!(codes(out, &[9, 9, 9, 9]), vec![65, 66, 257, 259]);
    }

    #[test]
    fn test_empty() {
        assert!(encode(b"", LzwConfig::NUFX).is_empty());
    }

    #[test]
    fn test_clear_code_emitted_at_ceiling() {
        // Distinct byte pairs never repeat, so every byte costs a code and
        // a 9-bit ceiling forces a clear after 254 emissions.
        let data: Vec<u8> = (0..=255u8).cycle().take(600).collect();
        let config = LzwConfig::new(9).unwrap();
        let out = encode(&data, config);

        let mut bits = BitReader::new(Cursor::new(out.clone()), 9).unwrap();
        let mut seen_clear = false;
        while let Some(code) = bits.read_code().unwrap() {
            assert!(code < 512);
            seen_clear |= code == CLEAR_CODE;
        }
        assert!(seen_clear);

        let mut bits = BitReader::new(Cursor::new(out), 9).unwrap();
        let mut decoder = LzwDecoder::new();
        let mut decoded = Vec::new();
        while let Some(byte) = decoder.read_byte(&mut bits).unwrap() {
            decoded.push(byte);
        }
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_writer() {
        let mut writer = LzwWriter::new(Vec::new(), LzwConfig::NUFX).unwrap();
        writer.write_all(b"TOBEORNOTTOBEORTOBEORNOT").unwrap();
        let out = writer.finish().unwrap();

        let mut decoded = Vec::new();
        let mut bits = BitReader::new(Cursor::new(out), 9).unwrap();
        let mut decoder = LzwDecoder::new();
        while let Some(byte) = decoder.read_byte(&mut bits).unwrap() {
            decoded.push(byte);
        }
        assert_eq!(decoded, b"TOBEORNOTTOBEORTOBEORNOT");
    }
}
