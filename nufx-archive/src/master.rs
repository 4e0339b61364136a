//! The master header at the start of every NuFX archive.

use chrono::NaiveDateTime;
use nufx_core::bytes::{LeReader, NUFILE_ID, Signature};
use nufx_core::error::{NufxError, Result};
use std::io::Read;

/// On-disk size of the master header, padding included.
pub const MASTER_HEADER_LEN: u64 = 48;

/// Size of the Binary II header that may precede the master header.
pub const BINARY_II_HEADER_LEN: u64 = 128;

/// Offset of the "files to follow" count in a Binary II header.
const BINARY_II_COUNT_OFFSET: usize = 127;

/// Archive-level metadata.
#[derive(Debug, Clone)]
pub struct MasterHeader {
    /// Stored CRC-16 of the header bytes after this field.
    pub master_crc: u16,
    /// Number of entries in the archive.
    pub total_records: u32,
    /// When the archive was created.
    pub archive_create_when: Option<NaiveDateTime>,
    /// When the archive was last modified.
    pub archive_mod_when: Option<NaiveDateTime>,
    /// Master header version.
    pub master_version: u16,
    /// Declared archive length. Only present for version 1 and later.
    pub master_eof: Option<u32>,
    /// Length of the Binary II wrapper before the archive (0 or 128).
    pub offset: u64,
    /// CRC computed while reading.
    pub computed_crc: u16,
}

impl MasterHeader {
    /// Find and read the master header.
    ///
    /// Leading junk is skipped and a single-file Binary II wrapper is
    /// unwrapped. A bare header block without a master header is rejected.
    pub fn read<R: Read>(reader: &mut LeReader<R>) -> Result<Self> {
        let mut offset = 0;
        let mut signature = match reader.seek_signature(6) {
            Err(e) if e.is_end_of_data() => {
                return Err(NufxError::unrecognized(
                    "Input ended before any archive signature",
                ));
            }
            other => other?,
        };

        if signature == Signature::BinaryII {
            reader.skip(BINARY_II_COUNT_OFFSET - 6)?;
            let files_to_follow = reader.read_u8()?;
            if files_to_follow != 0 {
                return Err(NufxError::unrecognized(
                    "Binary II archive with multiple files",
                ));
            }
            offset = BINARY_II_HEADER_LEN;
            log::debug!("Unwrapped Binary II header");
            signature = reader.seek_signature(6)?;
        }

        if signature != Signature::NuFile {
            return Err(NufxError::unrecognized(format!(
                "Expected a NuFile master header but found {signature}"
            )));
        }

        let start = reader.bytes_read() - NUFILE_ID.len() as u64;
        let master_crc = reader.read_word()?;
        reader.reset_crc();
        let total_records = reader.read_long()?;
        let archive_create_when = reader.read_date()?;
        let archive_mod_when = reader.read_date()?;
        let master_version = reader.read_word()?;
        let master_eof = if master_version > 0 {
            reader.skip(8)?;
            Some(reader.read_long()?)
        } else {
            None
        };

        while reader.bytes_read() < start + MASTER_HEADER_LEN {
            reader.read_u8()?;
        }
        let computed_crc = reader.crc();

        let header = Self {
            master_crc,
            total_records,
            archive_create_when,
            archive_mod_when,
            master_version,
            master_eof,
            offset,
            computed_crc,
        };
        if !header.is_crc_valid() {
            log::warn!(
                "Master header CRC mismatch: stored {:#06x}, computed {:#06x}",
                master_crc,
                computed_crc
            );
        }
        log::debug!(
            "Master header: version {}, {} records",
            master_version,
            total_records
        );
        Ok(header)
    }

    /// Whether the stored CRC matches the header bytes.
    pub fn is_crc_valid(&self) -> bool {
        self.master_crc == self.computed_crc
    }

    /// Whether the archive was wrapped in a Binary II header.
    pub fn is_binary_ii(&self) -> bool {
        self.offset == BINARY_II_HEADER_LEN
    }
}
