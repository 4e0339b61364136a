//! Whole-archive reader.

use crate::header::HeaderBlock;
use crate::master::MasterHeader;
use nufx_core::bytes::LeReader;
use nufx_core::error::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A parsed NuFX archive.
///
/// The whole structure is read up front from a forward-only source; thread
/// payloads are held in memory and decoded on demand.
#[derive(Debug)]
pub struct NufxArchive {
    master: MasterHeader,
    entries: Vec<HeaderBlock>,
    bytes_read: u64,
}

impl NufxArchive {
    /// Read an archive from any byte source.
    pub fn new<R: Read>(reader: R) -> Result<Self> {
        let mut reader = LeReader::new(reader);
        let master = MasterHeader::read(&mut reader)?;

        let mut entries = Vec::with_capacity(master.total_records.min(1024) as usize);
        for index in 0..master.total_records {
            let entry = HeaderBlock::read(&mut reader)?;
            log::trace!("Read entry {} of {}", index + 1, master.total_records);
            entries.push(entry);
        }

        Ok(Self {
            master,
            entries,
            bytes_read: reader.bytes_read(),
        })
    }

    /// Open and read an archive file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }

    /// The master header.
    pub fn master(&self) -> &MasterHeader {
        &self.master
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[HeaderBlock] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by its full filename.
    pub fn find(&self, name: &str) -> Option<&HeaderBlock> {
        self.entries.iter().find(|e| e.filename() == name)
    }

    /// Bytes consumed from the source, any wrapper included.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Uncompressed size of every entry's data threads.
    pub fn uncompressed_size(&self) -> u64 {
        self.entries.iter().map(HeaderBlock::uncompressed_size).sum()
    }

    /// Stored size of every entry's data threads.
    pub fn compressed_size(&self) -> u64 {
        self.entries.iter().map(HeaderBlock::compressed_size).sum()
    }
}

impl<'a> IntoIterator for &'a NufxArchive {
    type Item = &'a HeaderBlock;
    type IntoIter = std::slice::Iter<'a, HeaderBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
