//! Thread records: the forks inside an archive entry.
//!
//! A thread is described by a fixed 16-byte header (class, format, kind,
//! CRC, uncompressed length, compressed length). All thread headers of an
//! entry come first and the payloads follow in the same order, so a
//! [`ThreadRecord`] is built in two steps: [`ThreadRecord::read_header`]
//! and then [`ThreadRecord::read_data`].

use crate::filesys::FileSystemId;
use nufx_core::bytes::LeReader;
use nufx_core::error::{NufxError, Result};
use nufx_lzw::{Lzw1Reader, Lzw2Reader};
use std::fmt;
use std::io::{self, Read};

/// Size of a thread header on disk.
pub const THREAD_HEADER_LEN: usize = 16;

/// Block size used when a disk image records a block count.
const BLOCK_SIZE: u64 = 512;

/// Broad category of a thread (`thread_class`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadClass {
    /// Comments and icons.
    Message,
    /// Instructions such as "create directory".
    Control,
    /// File contents.
    Data,
    /// The entry's filename.
    Filename,
    /// A value outside the documented range.
    Unknown(u16),
}

impl ThreadClass {
    /// Decode a raw value, keeping unknown values.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x0000 => Self::Message,
            0x0001 => Self::Control,
            0x0002 => Self::Data,
            0x0003 => Self::Filename,
            other => Self::Unknown(other),
        }
    }

    /// The raw value.
    pub fn raw(&self) -> u16 {
        match self {
            Self::Message => 0x0000,
            Self::Control => 0x0001,
            Self::Data => 0x0002,
            Self::Filename => 0x0003,
            Self::Unknown(raw) => *raw,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message => "Message",
            Self::Control => "Control",
            Self::Data => "Data",
            Self::Filename => "Filename",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl TryFrom<u16> for ThreadClass {
    type Error = NufxError;

    fn try_from(raw: u16) -> Result<Self> {
        match Self::from_raw(raw) {
            Self::Unknown(raw) => Err(NufxError::unsupported(format!(
                "Unknown thread_class of {raw:#06x}"
            ))),
            class => Ok(class),
        }
    }
}

impl fmt::Display for ThreadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compression format of a thread (`thread_format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadFormat {
    /// Stored.
    Uncompressed,
    /// Huffman squeeze (SQ).
    HuffmanSqueeze,
    /// ShrinkIt LZW/1.
    DynamicLzw1,
    /// GS/ShrinkIt LZW/2.
    DynamicLzw2,
    /// Unix compress with 12-bit codes.
    Unix12BitCompress,
    /// Unix compress with 16-bit codes.
    Unix16BitCompress,
    /// A value outside the documented range.
    Unknown(u16),
}

impl ThreadFormat {
    /// Decode a raw value, keeping unknown values.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x0000 => Self::Uncompressed,
            0x0001 => Self::HuffmanSqueeze,
            0x0002 => Self::DynamicLzw1,
            0x0003 => Self::DynamicLzw2,
            0x0004 => Self::Unix12BitCompress,
            0x0005 => Self::Unix16BitCompress,
            other => Self::Unknown(other),
        }
    }

    /// The raw value.
    pub fn raw(&self) -> u16 {
        match self {
            Self::Uncompressed => 0x0000,
            Self::HuffmanSqueeze => 0x0001,
            Self::DynamicLzw1 => 0x0002,
            Self::DynamicLzw2 => 0x0003,
            Self::Unix12BitCompress => 0x0004,
            Self::Unix16BitCompress => 0x0005,
            Self::Unknown(raw) => *raw,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uncompressed => "Uncompressed",
            Self::HuffmanSqueeze => "Huffman Squeeze",
            Self::DynamicLzw1 => "Dynamic LZW/1",
            Self::DynamicLzw2 => "Dynamic LZW/2",
            Self::Unix12BitCompress => "Unix 12-bit Compress",
            Self::Unix16BitCompress => "Unix 16-bit Compress",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Returns true for anything but [`Uncompressed`](Self::Uncompressed).
    pub fn is_compressed(&self) -> bool {
        *self != Self::Uncompressed
    }

    /// Returns true if [`ThreadRecord::reader`] can decode this format.
    pub fn is_decodable(&self) -> bool {
        matches!(
            self,
            Self::Uncompressed | Self::DynamicLzw1 | Self::DynamicLzw2
        )
    }
}

impl TryFrom<u16> for ThreadFormat {
    type Error = NufxError;

    fn try_from(raw: u16) -> Result<Self> {
        match Self::from_raw(raw) {
            Self::Unknown(raw) => Err(NufxError::unsupported(format!(
                "Unknown thread_format of {raw:#06x}"
            ))),
            format => Ok(format),
        }
    }
}

impl fmt::Display for ThreadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a thread holds (`thread_kind`). The meaning of the raw value
/// depends on the thread class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadKind {
    /// Message: ASCII text.
    AsciiText,
    /// Message: preallocated comment space.
    AllocatedSpace,
    /// Message: an Apple IIgs icon.
    AppleIIgsIcon,
    /// Control: create a directory.
    CreateDirectory,
    /// Data: the data fork.
    DataFork,
    /// Data: a disk image.
    DiskImage,
    /// Data: the resource fork.
    ResourceFork,
    /// Filename: the entry's pathname.
    Filename,
    /// A value not defined for its class.
    Unknown(u16),
}

impl ThreadKind {
    /// Decode a raw value within `class`, keeping unknown values.
    pub fn from_raw(class: ThreadClass, raw: u16) -> Self {
        match (class, raw) {
            (ThreadClass::Message, 0x0000) => Self::AsciiText,
            (ThreadClass::Message, 0x0001) => Self::AllocatedSpace,
            (ThreadClass::Message, 0x0002) => Self::AppleIIgsIcon,
            (ThreadClass::Control, 0x0000) => Self::CreateDirectory,
            (ThreadClass::Data, 0x0000) => Self::DataFork,
            (ThreadClass::Data, 0x0001) => Self::DiskImage,
            (ThreadClass::Data, 0x0002) => Self::ResourceFork,
            (ThreadClass::Filename, 0x0000) => Self::Filename,
            (_, other) => Self::Unknown(other),
        }
    }

    /// Decode a raw value within `class`, rejecting unknown values.
    pub fn try_from_raw(class: ThreadClass, raw: u16) -> Result<Self> {
        match Self::from_raw(class, raw) {
            Self::Unknown(raw) => Err(NufxError::unsupported(format!(
                "Unknown thread_kind {raw:#06x} for {} thread_class",
                class.name()
            ))),
            kind => Ok(kind),
        }
    }

    /// The raw value.
    pub fn raw(&self) -> u16 {
        match self {
            Self::AsciiText | Self::CreateDirectory | Self::DataFork | Self::Filename => 0x0000,
            Self::AllocatedSpace | Self::DiskImage => 0x0001,
            Self::AppleIIgsIcon | Self::ResourceFork => 0x0002,
            Self::Unknown(raw) => *raw,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AsciiText => "ASCII text",
            Self::AllocatedSpace => "Allocated space",
            Self::AppleIIgsIcon => "Apple IIgs icon",
            Self::CreateDirectory => "Create directory",
            Self::DataFork => "Data fork",
            Self::DiskImage => "Disk image",
            Self::ResourceFork => "Resource fork",
            Self::Filename => "Filename",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for ThreadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uncompressed size of a disk image thread, from its entry's header.
///
/// `extra_type` holds the block count and `storage_type` the block size,
/// except that ShrinkIt 3.0.1 stored small values in `storage_type` and an
/// early GS/ShrinkIt used 256-byte blocks for 5.25" DOS 3.3 disks. Both
/// cases are really 512-byte blocks.
pub fn disk_image_eof(storage_type: u16, extra_type: u32, file_sys_id: u16) -> u64 {
    let blocks = u64::from(extra_type);
    if storage_type <= 13
        || (storage_type == 256 && extra_type == 280 && file_sys_id == FileSystemId::DOS33_RAW)
    {
        blocks * BLOCK_SIZE
    } else {
        blocks * u64::from(storage_type)
    }
}

/// Decode stored text: UTF-8 when valid, otherwise Mac OS Roman.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::MACINTOSH.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// A single thread of an archive entry.
#[derive(Debug, Clone)]
pub struct ThreadRecord {
    /// Thread class.
    pub thread_class: ThreadClass,
    /// Compression format.
    pub thread_format: ThreadFormat,
    /// Thread kind.
    pub thread_kind: ThreadKind,
    /// Stored CRC-16.
    pub thread_crc: u16,
    /// Uncompressed length (repaired for disk images).
    pub thread_eof: u64,
    /// Length of the payload in the archive.
    pub comp_thread_eof: u64,
    /// Payload bytes as stored.
    data: Vec<u8>,
}

impl ThreadRecord {
    /// Read a 16-byte thread header. The payload is read later with
    /// [`read_data`](Self::read_data).
    pub fn read_header<R: Read>(reader: &mut LeReader<R>) -> Result<Self> {
        let thread_class = ThreadClass::from_raw(reader.read_word()?);
        let thread_format = ThreadFormat::from_raw(reader.read_word()?);
        let thread_kind = ThreadKind::from_raw(thread_class, reader.read_word()?);
        let thread_crc = reader.read_word()?;
        let thread_eof = u64::from(reader.read_long()?);
        let comp_thread_eof = u64::from(reader.read_long()?);

        if let ThreadClass::Unknown(raw) = thread_class {
            log::warn!("Unknown thread_class {raw:#06x}");
        }
        if let ThreadFormat::Unknown(raw) = thread_format {
            log::warn!("Unknown thread_format {raw:#06x}");
        }
        if let ThreadKind::Unknown(raw) = thread_kind {
            log::warn!("Unknown thread_kind {raw:#06x} for {thread_class} thread");
        }

        Ok(Self {
            thread_class,
            thread_format,
            thread_kind,
            thread_crc,
            thread_eof,
            comp_thread_eof,
            data: Vec::new(),
        })
    }

    /// Apply the disk image size repair using the owning entry's fields.
    /// Threads of other kinds are left alone.
    pub fn repair_disk_image(&mut self, storage_type: u16, extra_type: u32, file_sys_id: u16) {
        if self.thread_kind != ThreadKind::DiskImage {
            return;
        }
        let repaired = disk_image_eof(storage_type, extra_type, file_sys_id);
        if repaired != self.thread_eof {
            log::debug!(
                "Disk image size {} repaired to {} (storage type {}, {} blocks)",
                self.thread_eof,
                repaired,
                storage_type,
                extra_type
            );
        }
        self.thread_eof = repaired;
    }

    /// Read the `comp_thread_eof` payload bytes.
    pub fn read_data<R: Read>(&mut self, reader: &mut LeReader<R>) -> Result<()> {
        let len = usize::try_from(self.comp_thread_eof)
            .map_err(|_| NufxError::unsupported("Thread too large for this platform"))?;
        self.data = reader.read_bytes(len)?;
        Ok(())
    }

    /// Payload bytes as stored (compressed).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns true for ASCII text and filename threads.
    pub fn is_text(&self) -> bool {
        matches!(
            self.thread_kind,
            ThreadKind::AsciiText | ThreadKind::Filename
        )
    }

    /// The first `thread_eof` payload bytes as text, for text threads.
    pub fn text(&self) -> Option<String> {
        if !self.is_text() {
            return None;
        }
        let len = usize::try_from(self.thread_eof)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        Some(decode_text(&self.data[..len]))
    }

    /// A decoded stream over the payload, selected by the thread format.
    ///
    /// Fails with `UnsupportedFormat` for formats without a decoder.
    pub fn reader(&self) -> Result<ThreadReader<'_>> {
        match self.thread_format {
            ThreadFormat::Uncompressed => Ok(ThreadReader::Raw(Read::take(
                self.data.as_slice(),
                self.thread_eof,
            ))),
            ThreadFormat::DynamicLzw1 => Ok(ThreadReader::Lzw1(Box::new(
                Lzw1Reader::new(self.data.as_slice())?.with_limit(self.thread_eof),
            ))),
            ThreadFormat::DynamicLzw2 => Ok(ThreadReader::Lzw2(Box::new(
                Lzw2Reader::new(self.data.as_slice())?.with_limit(self.thread_eof),
            ))),
            other => Err(NufxError::unsupported(format!(
                "The thread format {} ({:#06x}) has no decoder",
                other.name(),
                other.raw()
            ))),
        }
    }

    /// Decode the whole thread into memory.
    pub fn read_to_vec(&self) -> Result<Vec<u8>> {
        let mut reader = self.reader()?;
        let mut out = Vec::with_capacity(usize::try_from(self.thread_eof).unwrap_or(0));
        reader.read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Decoded byte stream of one thread.
#[derive(Debug)]
pub enum ThreadReader<'a> {
    /// Stored payload.
    Raw(io::Take<&'a [u8]>),
    /// LZW/1 payload.
    Lzw1(Box<Lzw1Reader<&'a [u8]>>),
    /// LZW/2 payload.
    Lzw2(Box<Lzw2Reader<&'a [u8]>>),
}

impl ThreadReader<'_> {
    /// Whether the decoded data matched the fork CRC.
    ///
    /// Only LZW/1 forks carry one; read the stream to the end first.
    pub fn is_crc_valid(&self) -> Option<bool> {
        match self {
            Self::Lzw1(reader) => reader.is_crc_valid(),
            Self::Raw(_) | Self::Lzw2(_) => None,
        }
    }
}

impl Read for ThreadReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Raw(reader) => reader.read(buf),
            Self::Lzw1(reader) => reader.read(buf),
            Self::Lzw2(reader) => reader.read(buf),
        }
    }
}
