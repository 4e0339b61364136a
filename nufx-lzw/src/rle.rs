//! ShrinkIt run-length encoding.
//!
//! A run is written as `escape, byte, count - 1`, so one escape sequence
//! covers 1 to 256 repetitions. Lone bytes are copied verbatim unless they
//! equal the escape byte, which always needs a sequence of its own.

use crate::error::{LzwError, Result};
use nufx_core::bytes::LeReader;
use nufx_core::traits::{ByteSource, SliceSource};
use std::io::{self, Read, Write};

/// ShrinkIt's default escape byte.
pub const DEFAULT_ESCAPE: u8 = 0xDB;

/// Longest run a single escape sequence can describe.
pub const MAX_RUN: usize = 256;

/// RLE decoder state.
#[derive(Debug, Clone)]
pub struct RleDecoder {
    escape: u8,
    repeated: u8,
    remaining: usize,
}

impl RleDecoder {
    /// Create a decoder for the given escape byte.
    pub fn new(escape: u8) -> Self {
        Self {
            escape,
            repeated: 0,
            remaining: 0,
        }
    }

    /// The escape byte.
    pub fn escape(&self) -> u8 {
        self.escape
    }

    /// Drop any run in progress.
    pub fn reset(&mut self) {
        self.remaining = 0;
    }

    /// Next decoded byte, or `None` once `source` is exhausted.
    pub fn read_byte<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<Option<u8>> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(Some(self.repeated));
        }

        let Some(byte) = source.next_byte()? else {
            return Ok(None);
        };
        if byte != self.escape {
            return Ok(Some(byte));
        }

        let repeated = source
            .next_byte()?
            .ok_or(LzwError::TruncatedRun { missing: 2 })?;
        let count = source
            .next_byte()?
            .ok_or(LzwError::TruncatedRun { missing: 1 })?;
        self.repeated = repeated;
        self.remaining = usize::from(count);
        Ok(Some(repeated))
    }
}

impl Default for RleDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_ESCAPE)
    }
}

/// RLE encoder state. Output is appended to a caller-supplied buffer.
#[derive(Debug, Clone)]
pub struct RleEncoder {
    escape: u8,
    run_byte: u8,
    run_len: usize,
}

impl RleEncoder {
    /// Create an encoder for the given escape byte.
    pub fn new(escape: u8) -> Self {
        Self {
            escape,
            run_byte: 0,
            run_len: 0,
        }
    }

    /// The escape byte.
    pub fn escape(&self) -> u8 {
        self.escape
    }

    /// Feed one byte.
    pub fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        if self.run_len > 0 && byte == self.run_byte {
            self.run_len += 1;
            if self.run_len == MAX_RUN {
                self.flush(out);
            }
            return;
        }
        self.flush(out);
        self.run_byte = byte;
        self.run_len = 1;
    }

    /// Write out the run in progress.
    pub fn flush(&mut self, out: &mut Vec<u8>) {
        match self.run_len {
            0 => {}
            1 if self.run_byte != self.escape => out.push(self.run_byte),
            len => out.extend_from_slice(&[self.escape, self.run_byte, (len - 1) as u8]),
        }
        self.run_len = 0;
    }
}

impl Default for RleEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_ESCAPE)
    }
}

/// RLE-encode `data` in one call.
pub fn encode(data: &[u8], escape: u8) -> Vec<u8> {
    let mut encoder = RleEncoder::new(escape);
    let mut out = Vec::with_capacity(data.len());
    for &byte in data {
        encoder.push(byte, &mut out);
    }
    encoder.flush(&mut out);
    out
}

/// RLE-decode `data` in one call.
pub fn decode(data: &[u8], escape: u8) -> Result<Vec<u8>> {
    let mut decoder = RleDecoder::new(escape);
    let mut source = SliceSource::new(data);
    let mut out = Vec::with_capacity(data.len());
    while let Some(byte) = decoder.read_byte(&mut source)? {
        out.push(byte);
    }
    Ok(out)
}

/// Streaming RLE decompressor.
#[derive(Debug)]
pub struct RleReader<R: Read> {
    source: LeReader<R>,
    decoder: RleDecoder,
}

impl<R: Read> RleReader<R> {
    /// Create a reader expanding runs from `reader`.
    pub fn new(reader: R, escape: u8) -> Self {
        Self {
            source: LeReader::new(reader),
            decoder: RleDecoder::new(escape),
        }
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }
}

impl<R: Read> Read for RleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.decoder.read_byte(&mut self.source)? {
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

/// Streaming RLE compressor.
///
/// Call [`finish`](Self::finish) to write the final run.
#[derive(Debug)]
pub struct RleWriter<W: Write> {
    writer: W,
    encoder: RleEncoder,
    buffer: Vec<u8>,
}

impl<W: Write> RleWriter<W> {
    /// Create a writer compressing runs into `writer`.
    pub fn new(writer: W, escape: u8) -> Self {
        Self {
            writer,
            encoder: RleEncoder::new(escape),
            buffer: Vec::new(),
        }
    }

    /// Write the final run and return the underlying sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.encoder.flush(&mut self.buffer);
        self.writer.write_all(&self.buffer)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> Write for RleWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.encoder.push(byte, &mut self.buffer);
        }
        self.writer.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
