//! Header blocks: one per archive entry.

use crate::filesys::{self, FileSystemId};
use crate::thread::{self, ThreadClass, ThreadKind, ThreadRecord};
use chrono::NaiveDateTime;
use nufx_core::bytes::{LeReader, Signature};
use nufx_core::error::{NufxError, Result};
use std::io::Read;
use std::sync::OnceLock;

/// Size of the fixed part of a header block, as counted by `attrib_count`.
const FIXED_ATTRIB_LEN: i64 = 58;

/// Inline filename used when an entry stores none.
pub const UNKNOWN_FILENAME: &str = "Unknown";

/// An archive entry: a file, directory, or disk image.
#[derive(Debug)]
pub struct HeaderBlock {
    /// Stored CRC-16 of the header.
    pub header_crc: u16,
    /// Length of the attribute section, filename length word included.
    pub attrib_count: u16,
    /// Header block version.
    pub version_number: u16,
    /// Number of threads that follow.
    pub total_threads: u32,
    /// Native file system of the entry.
    pub file_sys_id: u16,
    /// File system info; the low byte is the path separator.
    pub file_sys_info: u16,
    /// Access flags.
    pub access: u32,
    /// File type (ProDOS file type for files).
    pub file_type: u32,
    /// Auxiliary type, or the block count of a disk image.
    pub extra_type: u32,
    /// Storage type, or the block size of a disk image.
    pub storage_type: u16,
    /// Creation date.
    pub create_when: Option<NaiveDateTime>,
    /// Modification date.
    pub mod_when: Option<NaiveDateTime>,
    /// Date the entry was archived.
    pub archive_when: Option<NaiveDateTime>,
    /// Size of the option list (version 1 and later).
    pub option_size: u16,
    /// Raw option list bytes.
    pub option_list: Vec<u8>,
    /// Raw bytes of attributes this reader does not interpret.
    pub attrib_bytes: Vec<u8>,
    /// Inline filename from pre-3 archives, or `"Unknown"`.
    pub raw_filename: String,
    /// CRC computed over the header and its thread headers.
    pub computed_crc: u16,
    /// Threads in file order.
    threads: Vec<ThreadRecord>,
    /// Resolved filename.
    filename: OnceLock<String>,
}

impl HeaderBlock {
    /// Read a header block, its thread headers, and the thread payloads.
    pub fn read<R: Read>(reader: &mut LeReader<R>) -> Result<Self> {
        let signature = reader.seek_signature(4)?;
        if signature != Signature::NuFx {
            return Err(NufxError::unrecognized(format!(
                "Expected a NuFX header block but found {signature}"
            )));
        }

        let header_crc = reader.read_word()?;
        reader.reset_crc();
        let attrib_count = reader.read_word()?;
        let version_number = reader.read_word()?;
        let total_threads = reader.read_long()?;
        let file_sys_id = reader.read_word()?;
        let file_sys_info = reader.read_word()?;
        let access = reader.read_long()?;
        let file_type = reader.read_long()?;
        let extra_type = reader.read_long()?;
        let storage_type = reader.read_word()?;
        let create_when = reader.read_date()?;
        let mod_when = reader.read_date()?;
        let archive_when = reader.read_date()?;

        let mut option_size = 0;
        let mut option_list = Vec::new();
        if version_number >= 1 {
            option_size = reader.read_word()?;
            if option_size > 0 {
                option_list = reader.read_bytes(usize::from(option_size.saturating_sub(2)))?;
            }
        }

        let attrib_len = attrib_section_len(attrib_count, version_number, option_size);
        let attrib_bytes = if attrib_len > 0 {
            reader.read_bytes(usize::try_from(attrib_len).unwrap_or(0))?
        } else {
            Vec::new()
        };

        let name_len = reader.read_word()?;
        let raw_filename = if name_len > 0 {
            thread::decode_text(&reader.read_bytes(usize::from(name_len))?)
        } else {
            UNKNOWN_FILENAME.to_owned()
        };

        let mut threads = Vec::with_capacity(total_threads.min(16) as usize);
        for _ in 0..total_threads {
            let mut record = ThreadRecord::read_header(reader)?;
            record.repair_disk_image(storage_type, extra_type, file_sys_id);
            threads.push(record);
        }
        let computed_crc = reader.crc();

        for record in &mut threads {
            record.read_data(reader)?;
        }

        let header = Self {
            header_crc,
            attrib_count,
            version_number,
            total_threads,
            file_sys_id,
            file_sys_info,
            access,
            file_type,
            extra_type,
            storage_type,
            create_when,
            mod_when,
            archive_when,
            option_size,
            option_list,
            attrib_bytes,
            raw_filename,
            computed_crc,
            threads,
            filename: OnceLock::new(),
        };
        if !header.is_crc_valid() {
            log::warn!(
                "Header CRC mismatch for {}: stored {:#06x}, computed {:#06x}",
                header.filename(),
                header_crc,
                computed_crc
            );
        }
        log::debug!(
            "Entry {}: version {}, {} threads",
            header.filename(),
            version_number,
            total_threads
        );
        Ok(header)
    }

    /// Threads in file order.
    pub fn threads(&self) -> &[ThreadRecord] {
        &self.threads
    }

    /// The entry's path with `/` separators.
    ///
    /// A filename thread takes precedence over the inline name.
    pub fn filename(&self) -> &str {
        self.filename.get_or_init(|| {
            self.find_thread(ThreadKind::Filename)
                .and_then(ThreadRecord::text)
                .unwrap_or_else(|| self.raw_filename.clone())
                .replace(':', "/")
        })
    }

    /// The last component of [`filename`](Self::filename).
    pub fn final_filename(&self) -> &str {
        let name = self.filename();
        let trimmed = name.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// First thread of the given kind.
    pub fn find_thread(&self, kind: ThreadKind) -> Option<&ThreadRecord> {
        self.threads.iter().find(|t| t.thread_kind == kind)
    }

    /// The data fork, or the disk image when there is no data fork.
    pub fn data_fork(&self) -> Option<&ThreadRecord> {
        self.find_thread(ThreadKind::DataFork)
            .or_else(|| self.find_thread(ThreadKind::DiskImage))
    }

    /// The resource fork.
    pub fn resource_fork(&self) -> Option<&ThreadRecord> {
        self.find_thread(ThreadKind::ResourceFork)
    }

    /// Whether the entry holds a disk image.
    pub fn is_disk_image(&self) -> bool {
        self.find_thread(ThreadKind::DiskImage).is_some()
    }

    fn data_threads(&self) -> impl Iterator<Item = &ThreadRecord> {
        self.threads
            .iter()
            .filter(|t| t.thread_class == ThreadClass::Data)
    }

    /// Uncompressed size of all data threads.
    pub fn uncompressed_size(&self) -> u64 {
        self.data_threads().map(|t| t.thread_eof).sum()
    }

    /// Stored size of all data threads.
    pub fn compressed_size(&self) -> u64 {
        self.data_threads().map(|t| t.comp_thread_eof).sum()
    }

    /// Uncompressed size of every thread, whatever its class.
    pub fn total_thread_eof(&self) -> u64 {
        self.threads.iter().map(|t| t.thread_eof).sum()
    }

    /// The entry's file system.
    pub fn file_system(&self) -> FileSystemId {
        FileSystemId::from_raw(self.file_sys_id)
    }

    /// Path separator of the entry's native file system, if recognized.
    pub fn file_system_separator(&self) -> Option<char> {
        filesys::separator_from_info(self.file_sys_info)
    }

    /// Whether the stored CRC matches the header bytes.
    pub fn is_crc_valid(&self) -> bool {
        self.header_crc == self.computed_crc
    }
}

/// Length of the attribute bytes that follow the option list.
///
/// `attrib_count` covers the fixed fields and the filename length word.
/// From version 1 on it also covers the option list, which counts as two
/// bytes when empty.
pub fn attrib_section_len(attrib_count: u16, version_number: u16, option_size: u16) -> i64 {
    let mut len = i64::from(attrib_count) - FIXED_ATTRIB_LEN;
    if version_number >= 1 {
        len -= if option_size == 0 {
            2
        } else {
            i64::from(option_size)
        };
    }
    len
}
