//! Little-endian primitive I/O with a running CRC-16.
//!
//! [`LeReader`] is the lowest layer of the archive parser. Every byte it
//! hands out is folded into a CRC-16 and counted, which is what the master
//! header and header block parsers rely on to validate their checksums and
//! to find their own padding. [`LeWriter`] is the mirror image and is used
//! to produce archive structures (tests build synthetic archives with it).
//!
//! The reader also knows how to find the start of an archive: NuFX data may
//! be preceded by junk or wrapped in a Binary II header, so
//! [`LeReader::seek_signature`] scans forward for one of three signatures.

use crate::crc::Crc16;
use crate::error::{NufxError, Result};
use crate::timerec::{self, TIMEREC_LENGTH};
use crate::traits::ByteSource;
use chrono::NaiveDateTime;
use std::io::{self, Read, Write};

/// "NuFile" in alternating high/low ASCII: the master header signature.
pub const NUFILE_ID: [u8; 6] = [0x4e, 0xf5, 0x46, 0xe9, 0x6c, 0xe5];

/// "NuFX" in alternating high/low ASCII: the header block signature.
pub const NUFX_ID: [u8; 4] = [0x4e, 0xf5, 0x46, 0xd8];

/// Binary II header signature.
pub const BXY_ID: [u8; 3] = [0x0a, 0x47, 0x4c];

/// Maximum number of bytes scanned when looking for a signature.
pub const SIGNATURE_SCAN_WINDOW: usize = 2048;

/// Result of a signature scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Master header of a NuFX archive ("NuFile").
    NuFile,
    /// A bare header block ("NuFX") without a master header.
    NuFx,
    /// A Binary II wrapper.
    BinaryII,
    /// Nothing recognizable within the scan window.
    Unknown,
}

impl Signature {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NuFile => "NuFile",
            Self::NuFx => "NuFX",
            Self::BinaryII => "Binary II",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Read a single byte, returning `None` at end of input.
pub(crate) fn read_one<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Little-endian reader that tracks a CRC-16 and a byte count.
#[derive(Debug)]
pub struct LeReader<R: Read> {
    /// Underlying byte source.
    reader: R,
    /// CRC-16 over every byte read since the last reset.
    crc: Crc16,
    /// Total number of bytes read.
    bytes_read: u64,
}

impl<R: Read> LeReader<R> {
    /// Create a new reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            crc: Crc16::new(),
            bytes_read: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    ///
    /// Bytes read directly from the inner reader bypass the CRC and counter.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume the reader and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Total number of bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Current CRC-16 value.
    pub fn crc(&self) -> u16 {
        self.crc.value()
    }

    /// Reset the CRC-16 to 0x0000.
    pub fn reset_crc(&mut self) {
        self.crc.reset();
    }

    /// Read the next byte, or `None` at end of input.
    pub fn try_read_u8(&mut self) -> Result<Option<u8>> {
        let byte = read_one(&mut self.reader)?;
        if let Some(b) = byte {
            self.crc.update_byte(b);
            self.bytes_read += 1;
        }
        Ok(byte)
    }

    /// Read the next byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.try_read_u8()?.ok_or(NufxError::end_of_data(1))
    }

    /// Read exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(len.min(64 * 1024));
        (&mut self.reader).take(len as u64).read_to_end(&mut data)?;
        self.crc.update(&data);
        self.bytes_read += data.len() as u64;
        if data.len() < len {
            return Err(NufxError::end_of_data(len - data.len()));
        }
        Ok(data)
    }

    /// Read and discard exactly `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        for _ in 0..len {
            self.read_u8()?;
        }
        Ok(())
    }

    /// Read a 16-bit little-endian word.
    pub fn read_word(&mut self) -> Result<u16> {
        let lo = self.read_u8()?;
        let hi = self.read_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Read a 32-bit little-endian long.
    pub fn read_long(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        for slot in &mut buf {
            *slot = self.read_u8()?;
        }
        Ok(u32::from_le_bytes(buf))
    }

    /// Read an 8-byte TimeRec. The all-zero record reads as `None`.
    pub fn read_date(&mut self) -> Result<Option<NaiveDateTime>> {
        let mut buf = [0u8; TIMEREC_LENGTH];
        for slot in &mut buf {
            *slot = self.read_u8()?;
        }
        Ok(timerec::decode(&buf))
    }

    /// Scan forward for an archive signature.
    ///
    /// `max_len` bytes are read up front and the window then advances one
    /// byte at a time, up to [`SIGNATURE_SCAN_WINDOW`] bytes in total. The
    /// 6-byte NuFile signature is only tested when `max_len` is 6. Scanned
    /// bytes are consumed: after a match at offset `n` the reader sits
    /// `n + max_len` bytes past where the scan began.
    pub fn seek_signature(&mut self, max_len: usize) -> Result<Signature> {
        let max_len = max_len.clamp(BXY_ID.len(), NUFILE_ID.len());
        let mut window = [0u8; SIGNATURE_SCAN_WINDOW];
        for slot in window.iter_mut().take(max_len) {
            *slot = self.read_u8()?;
        }

        let mut pos = 0;
        while pos < SIGNATURE_SCAN_WINDOW - max_len {
            let candidate = &window[pos..];
            if max_len == NUFILE_ID.len() && candidate.starts_with(&NUFILE_ID) {
                return Ok(Signature::NuFile);
            }
            if candidate.starts_with(&NUFX_ID) {
                return Ok(Signature::NuFx);
            }
            if candidate.starts_with(&BXY_ID) {
                return Ok(Signature::BinaryII);
            }
            window[pos + max_len] = self.read_u8()?;
            pos += 1;
        }
        Ok(Signature::Unknown)
    }
}

impl<R: Read> Read for LeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.crc.update(&buf[..n]);
        self.bytes_read += n as u64;
        Ok(n)
    }
}

impl<R: Read> ByteSource for LeReader<R> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        self.try_read_u8()
    }
}

/// Little-endian writer that tracks a CRC-16 and a byte count.
#[derive(Debug)]
pub struct LeWriter<W: Write> {
    /// Underlying byte sink.
    writer: W,
    /// CRC-16 over every byte written since the last reset.
    crc: Crc16,
    /// Total number of bytes written.
    bytes_written: u64,
}

impl<W: Write> LeWriter<W> {
    /// Create a new writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            crc: Crc16::new(),
            bytes_written: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Total number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Current CRC-16 value.
    pub fn crc(&self) -> u16 {
        self.crc.value()
    }

    /// Reset the CRC-16 to 0x0000.
    pub fn reset_crc(&mut self) {
        self.crc.reset();
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.write_bytes(&[byte])
    }

    /// Write a byte slice.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.crc.update(data);
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Write a 16-bit little-endian word.
    pub fn write_word(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a 32-bit little-endian long.
    pub fn write_long(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write an 8-byte TimeRec; `None` writes the all-zero record.
    pub fn write_date(&mut self, date: Option<&NaiveDateTime>) -> Result<()> {
        self.write_bytes(&timerec::encode(date))
    }

    /// Write a signature. `Unknown` writes nothing.
    pub fn write_signature(&mut self, signature: Signature) -> Result<()> {
        match signature {
            Signature::NuFile => self.write_bytes(&NUFILE_ID),
            Signature::NuFx => self.write_bytes(&NUFX_ID),
            Signature::BinaryII => self.write_bytes(&BXY_ID),
            Signature::Unknown => Ok(()),
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut reader = LeReader::new(Cursor::new(data));
        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_word().unwrap(), 0x1234);
        assert_eq!(reader.read_long().unwrap(), 0x12345678);
        assert_eq!(reader.bytes_read(), 7);
        assert!(reader.read_u8().unwrap_err().is_end_of_data());
    }

    #[test]
    fn test_read_long_high_bit() {
        let mut reader = LeReader::new(Cursor::new([0xff, 0xff, 0xff, 0xff]));
        assert_eq!(reader.read_long().unwrap(), 0xffff_ffff);
    }

    #[test]
    fn test_read_bytes() {
        let mut reader = LeReader::new(Cursor::new(b"abc".to_vec()));
        assert_eq!(reader.read_bytes(2).unwrap(), b"ab");
        let err = reader.read_bytes(3).unwrap_err();
        assert!(matches!(err, NufxError::EndOfData { expected: 2 }));
        // Zero-length reads succeed even when exhausted.
        assert!(reader.read_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn test_crc_tracking() {
        let mut reader = LeReader::new(Cursor::new(b"xx123456789".to_vec()));
        reader.read_word().unwrap();
        reader.reset_crc();
        reader.read_bytes(9).unwrap();
        assert_eq!(reader.crc(), 0x31C3);
        assert_eq!(reader.bytes_read(), 11);
    }

    #[test]
    fn test_seek_nufile() {
        let mut data = NUFILE_ID.to_vec();
        data.extend_from_slice(&[0xaa, 0xbb]);
        let mut reader = LeReader::new(Cursor::new(data));
        assert_eq!(reader.seek_signature(6).unwrap(), Signature::NuFile);
        assert_eq!(reader.bytes_read(), 6);
        assert_eq!(reader.read_u8().unwrap(), 0xaa);
    }

    #[test]
    fn test_seek_nufx_after_junk() {
        let mut data = vec![0x00, 0x11, 0x22];
        data.extend_from_slice(&NUFX_ID);
        data.push(0x99);
        let mut reader = LeReader::new(Cursor::new(data));
        assert_eq!(reader.seek_signature(4).unwrap(), Signature::NuFx);
        assert_eq!(reader.read_u8().unwrap(), 0x99);
    }

    #[test]
    fn test_nufile_ignored_for_short_scan() {
        // With a 4-byte window the NuFile signature is not considered; the
        // scan walks past it and finds the following NuFX block.
        let mut data = NUFILE_ID.to_vec();
        data.extend_from_slice(&NUFX_ID);
        data.extend_from_slice(&[0; 4]);
        let mut reader = LeReader::new(Cursor::new(data));
        assert_eq!(reader.seek_signature(4).unwrap(), Signature::NuFx);
        assert_eq!(reader.bytes_read(), 10);
    }

    #[test]
    fn test_seek_binary_ii() {
        let mut data = BXY_ID.to_vec();
        data.extend_from_slice(&[0; 8]);
        let mut reader = LeReader::new(Cursor::new(data));
        assert_eq!(reader.seek_signature(6).unwrap(), Signature::BinaryII);
    }

    #[test]
    fn test_seek_unknown() {
        let data = vec![0x20u8; SIGNATURE_SCAN_WINDOW + 16];
        let mut reader = LeReader::new(Cursor::new(data));
        assert_eq!(reader.seek_signature(6).unwrap(), Signature::Unknown);
        assert_eq!(reader.bytes_read(), SIGNATURE_SCAN_WINDOW as u64);
    }

    #[test]
    fn test_seek_truncated() {
        let mut reader = LeReader::new(Cursor::new(vec![0x20u8; 10]));
        assert!(reader.seek_signature(6).unwrap_err().is_end_of_data());
    }

    #[test]
    fn test_writer_mirrors_reader() {
        let mut writer = LeWriter::new(Vec::new());
        writer.write_signature(Signature::NuFx).unwrap();
        writer.reset_crc();
        writer.write_word(0xbeef).unwrap();
        writer.write_long(0x0001_acae).unwrap();
        writer.write_date(None).unwrap();
        let crc = writer.crc();
        assert_eq!(writer.bytes_written(), 18);
        let bytes = writer.into_inner().unwrap();

        let mut reader = LeReader::new(Cursor::new(bytes));
        assert_eq!(reader.seek_signature(4).unwrap(), Signature::NuFx);
        reader.reset_crc();
        assert_eq!(reader.read_word().unwrap(), 0xbeef);
        assert_eq!(reader.read_long().unwrap(), 0x0001_acae);
        assert_eq!(reader.read_date().unwrap(), None);
        assert_eq!(reader.crc(), crc);
    }
}
