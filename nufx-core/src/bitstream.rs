//! Variable-width bit streams for LZW codes.
//!
//! NuFX LZW codes start at 9 bits and grow one bit at a time as the
//! dictionary fills, so unlike a Huffman bit reader the width here is a
//! piece of stream state rather than an argument to each read. Codes are
//! packed LSB-first: each new byte lands above the bits already buffered.
//!
//! # Example
//!
//! ```
//! use nufx_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut writer = BitWriter::new(Vec::new(), 9).unwrap();
//! writer.write_code(0x41).unwrap();
//! writer.write_code(0x100).unwrap();
//! let output = writer.into_inner().unwrap();
//!
//! let mut reader = BitReader::new(Cursor::new(output), 9).unwrap();
//! assert_eq!(reader.read_code().unwrap(), Some(0x41));
//! assert_eq!(reader.read_code().unwrap(), Some(0x100));
//! ```

use crate::bytes::read_one;
use crate::error::{NufxError, Result};
use std::io::{Read, Write};

/// Widest code the bit streams support.
pub const MAX_WIDTH: u8 = 24;

fn check_width(width: u8) -> Result<u32> {
    if width == 0 || width > MAX_WIDTH {
        return Err(NufxError::InvalidBitWidth(width));
    }
    Ok((1u32 << width) - 1)
}

/// Reads fixed-width codes from a byte source.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Current code width.
    width: u8,
    /// `(1 << width) - 1`.
    mask: u32,
}

impl<R: Read> BitReader<R> {
    /// Create a reader returning `width`-bit codes.
    pub fn new(reader: R, width: u8) -> Result<Self> {
        let mask = check_width(width)?;
        Ok(Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            width,
            mask,
        })
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    ///
    /// Reading from it directly is only meaningful after
    /// [`clear_buffered`](Self::clear_buffered).
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Current code width in bits.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Mask for the current width.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Number of bits currently buffered.
    pub fn bits_buffered(&self) -> u8 {
        self.bits_in_buffer
    }

    /// Change the width of subsequent reads.
    pub fn set_width(&mut self, width: u8) -> Result<()> {
        self.mask = check_width(width)?;
        self.width = width;
        Ok(())
    }

    /// Widen subsequent reads by one bit.
    pub fn increase_width(&mut self) -> Result<()> {
        self.set_width(self.width + 1)
    }

    /// Discard any partially consumed byte.
    pub fn clear_buffered(&mut self) {
        self.buffer = 0;
        self.bits_in_buffer = 0;
    }

    /// Read the next code, or `None` if the source runs dry first.
    pub fn read_code(&mut self) -> Result<Option<u32>> {
        while self.bits_in_buffer < self.width {
            let Some(byte) = read_one(&mut self.reader)? else {
                return Ok(None);
            };
            self.buffer |= u64::from(byte) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
        }

        let code = (self.buffer as u32) & self.mask;
        self.buffer >>= self.width;
        self.bits_in_buffer -= self.width;
        Ok(Some(code))
    }
}

/// Writes fixed-width codes to a byte sink.
///
/// Call [`finish`](Self::finish) or [`into_inner`](Self::into_inner) to
/// flush the final partial byte; dropping the writer loses it.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Current code width.
    width: u8,
    /// `(1 << width) - 1`.
    mask: u32,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer emitting `width`-bit codes.
    pub fn new(writer: W, width: u8) -> Result<Self> {
        let mask = check_width(width)?;
        Ok(Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            width,
            mask,
        })
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    ///
    /// Writing to it directly is only meaningful after [`align`](Self::align).
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Current code width in bits.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Mask for the current width.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Change the width of subsequent writes.
    pub fn set_width(&mut self, width: u8) -> Result<()> {
        self.mask = check_width(width)?;
        self.width = width;
        Ok(())
    }

    /// Widen subsequent writes by one bit.
    pub fn increase_width(&mut self) -> Result<()> {
        self.set_width(self.width + 1)
    }

    /// Write one code, masked to the current width.
    pub fn write_code(&mut self, code: u32) -> Result<()> {
        self.buffer |= u64::from(code & self.mask) << self.bits_in_buffer;
        self.bits_in_buffer += self.width;
        while self.bits_in_buffer >= 8 {
            self.writer.write_all(&[self.buffer as u8])?;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
        Ok(())
    }

    /// Flush a partial byte, padding its high bits with zeros.
    pub fn align(&mut self) -> Result<()> {
        if self.bits_in_buffer > 0 {
            self.writer.write_all(&[self.buffer as u8])?;
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
        Ok(())
    }

    /// Flush any partial byte and the underlying writer.
    pub fn finish(&mut self) -> Result<()> {
        self.align()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Finish the stream and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.finish()?;
        Ok(self.writer)
    }
}
