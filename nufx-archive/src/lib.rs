//! # NuFX Archive
//!
//! Reader for NuFX archives, the container written by ShrinkIt and
//! GS/ShrinkIt (`.shk`, `.sdk`, and `.bxy` files).
//!
//! An archive is a tree read once from front to back:
//!
//! - [`MasterHeader`]: signature, entry count, dates, and a CRC. It may be
//!   preceded by a single-file Binary II header.
//! - [`HeaderBlock`]: one per entry, with file system metadata and a list
//!   of threads.
//! - [`ThreadRecord`]: one per fork (data, resource, disk image, filename,
//!   comment), stored raw or compressed with LZW/1 or LZW/2.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nufx_archive::NufxArchive;
//! use std::io::Read;
//!
//! let archive = NufxArchive::open("disks.shk").unwrap();
//! for entry in archive.entries() {
//!     println!("{} ({} bytes)", entry.filename(), entry.uncompressed_size());
//!     if let Some(fork) = entry.data_fork() {
//!         let mut data = Vec::new();
//!         fork.reader().unwrap().read_to_end(&mut data).unwrap();
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod filesys;
pub mod header;
pub mod master;
pub mod thread;

// Re-exports
pub use archive::NufxArchive;
pub use filesys::FileSystemId;
pub use header::HeaderBlock;
pub use master::MasterHeader;
pub use thread::{ThreadClass, ThreadFormat, ThreadKind, ThreadReader, ThreadRecord};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::archive::NufxArchive;
    pub use crate::header::HeaderBlock;
    pub use crate::thread::{ThreadClass, ThreadFormat, ThreadKind, ThreadRecord};
    pub use nufx_core::error::{NufxError, Result};
}
